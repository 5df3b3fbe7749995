//! Error type returned by every handler.
//!
//! Failures render as `{"error": "<message>", "code": "<code>"}`, plus a
//! `details` map of per-field messages when validation fails.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::crypto::TokenError;
use crate::db::StoreError;

/// Machine-readable failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BadRequest,
    Validation,
    /// Duplicate username
    Conflict,
    Unauthorized,
    NotFound,
    Internal,
    Database,
}

impl ErrorCode {
    /// HTTP status for this category. Conflicts are reported as 400, which is
    /// what existing clients expect for a taken username.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::BadRequest | ErrorCode::Validation | ErrorCode::Conflict => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Internal | ErrorCode::Database => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "bad_request",
            ErrorCode::Validation => "validation_error",
            ErrorCode::Conflict => "conflict",
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::NotFound => "not_found",
            ErrorCode::Internal => "internal_error",
            ErrorCode::Database => "database_error",
        }
    }
}

/// Serialized error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Vec<String>>>,
}

#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    details: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Generic 500; the cause should already have been logged
    pub fn internal() -> Self {
        Self::new(ErrorCode::Internal, "An internal error occurred")
    }

    /// Validation failure carrying per-field messages. The top-level message
    /// is the single message when there is exactly one.
    pub fn invalid_fields(details: HashMap<String, Vec<String>>) -> Self {
        let message = match details.values().flatten().collect::<Vec<_>>().as_slice() {
            [only] => (*only).clone(),
            _ => format!("Invalid input in {} field(s)", details.len()),
        };

        Self {
            code: ErrorCode::Validation,
            message,
            details: Some(details),
        }
    }

    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut details = FieldErrors::default();
        details.add(field, message);
        Self::invalid_fields(details.0)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.message,
            code: self.code.as_str(),
            details: self.details,
        };
        (status, Json(body)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code.as_str())
    }
}

impl std::error::Error for ApiError {}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = %err, "Store query failed");
        Self::new(ErrorCode::Database, "A database error occurred")
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            StoreError::DuplicateUsername => ApiError::conflict("expected `username` to be unique"),
            StoreError::Validation { field, message } => ApiError::invalid_field(field, message),
            StoreError::NotOwner(what) => {
                ApiError::unauthorized(format!("only the owner can delete this {}", what))
            }
            StoreError::Database(e) => e.into(),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => ApiError::unauthorized("token expired"),
            TokenError::Invalid => ApiError::unauthorized("token invalid"),
            TokenError::Lifetime(secs) => {
                tracing::error!(ttl_secs = secs, "Token expiry out of range");
                ApiError::internal()
            }
            TokenError::Signing(e) => {
                tracing::error!(error = %e, "Token signing failed");
                ApiError::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(format!("Malformed request body: {}", rejection.body_text()))
    }
}

/// Collects per-field messages while a request body is checked
#[derive(Debug, Default)]
pub struct FieldErrors(HashMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// Record the error side of a field check, if any
    pub fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::invalid_fields(self.0))
        }
    }
}
