use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{users, RegisterRequest, UserResponse};
use crate::AppState;

use super::auth::hash_password_blocking;
use super::error::{ApiError, FieldErrors};
use super::validation::{validate_password, validate_username};

/// Validate a RegisterRequest
fn validate_register_request(req: &RegisterRequest) -> Result<(), ApiError> {
    let mut errors = FieldErrors::default();
    errors.check("username", validate_username(req.username.as_deref()));
    errors.check("password", validate_password(req.password.as_deref()));
    errors.into_result()
}

/// Register a new user
///
/// POST /api/users
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(req) = payload?;
    validate_register_request(&req)?;

    let username = req.username.unwrap_or_default();
    let name = req.name.unwrap_or_default();
    let password_hash = hash_password_blocking(req.password.unwrap_or_default()).await?;

    let user = users::create(&state.db, &username, &name, &password_hash).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// List all users
///
/// GET /api/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = users::list_all(&state.db).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
