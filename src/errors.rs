use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    http::StatusCode,
    Json
};
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the card store, scheduler, sync and backup layers
///
/// None of these are fatal to the process: callers report them and carry on
/// with the pre-operation state.
#[derive(Error, Debug)]
pub enum AppError {
    /// The local storage medium failed (unavailable, corrupt, full)
    #[error("Storage error: {0}")]
    Storage(String),
    /// The remote replica or identity service could not be reached
    #[error("Network error: {0}")]
    Network(String),
    /// A record or row failed validation
    #[error("Validation error: {0}")]
    Validation(String),
    /// A review outcome label outside the known set
    #[error("Invalid outcome: {0}")]
    InvalidOutcome(String),
    #[error("Not signed in")]
    NotAuthenticated,
    #[error("Not found: {0}")]
    NotFound(String),
    /// The identity provider rejected a sign-in, sign-up or sign-out
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl AppError {
    /// Wraps any repository failure as a storage error
    pub fn storage(err: impl std::fmt::Display) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Storage(format!("{:#}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

/// Errors returned by the document store HTTP API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
    #[error("Document not found")]
    NotFound,
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Invalid credentials")]
    Unauthorized,
    #[error("Account already exists: {0}")]
    Conflict(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                error!("Database error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Document not found".to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()),
            ApiError::Conflict(email) => (StatusCode::CONFLICT, format!("Account already exists: {}", email)),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests;
