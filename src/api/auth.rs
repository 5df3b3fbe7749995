use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    Json,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use super::error::ApiError;
use crate::crypto::{hash_password, verify_password};
use crate::db::{users, LoginRequest, LoginResponse};
use crate::AppState;

/// Verified against when the username is unknown, so both failure paths
/// cost one hash verification.
static DUMMY_HASH: OnceCell<String> = OnceCell::const_new();

async fn dummy_hash() -> Result<&'static str, ApiError> {
    DUMMY_HASH
        .get_or_try_init(|| hash_password_blocking("not-a-real-password".to_string()))
        .await
        .map(String::as_str)
}

/// Identity of the caller, taken from a verified bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Extractor for routes that require a bearer token
#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Token missing"))?;

        let claims = state.tokens.verify(token).map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            ApiError::from(e)
        })?;

        Ok(AuthUser {
            id: claims.id,
            username: claims.username,
        })
    }
}

/// Hash on the blocking pool so the executor is not stalled
pub(crate) async fn hash_password_blocking(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            error!("Password hashing task failed: {}", e);
            ApiError::internal()
        })?
        .map_err(|e| {
            error!("Failed to hash password: {}", e);
            ApiError::internal()
        })
}

async fn verify_password_blocking(password: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| {
            error!("Password verification task failed: {}", e);
            ApiError::internal()
        })
}

/// Login endpoint
///
/// POST /api/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;

    let user = users::find_by_username(&state.db, &request.username).await?;

    let hash = match &user {
        Some(u) => u.password_hash.clone(),
        None => dummy_hash().await?.to_string(),
    };
    let password_ok = verify_password_blocking(request.password, hash).await?;

    // Unknown user and wrong password are indistinguishable to the caller
    let user = match user {
        Some(u) if password_ok => u,
        _ => {
            debug!(username = %request.username, "Login failed");
            return Err(ApiError::unauthorized("invalid username or password"));
        }
    };

    let token = state.tokens.issue(&user.id, &user.username)?;

    info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        username: user.username,
        name: user.name,
    }))
}
