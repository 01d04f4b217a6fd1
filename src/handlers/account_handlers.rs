use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::DbPool;
use crate::dto::CredentialsDto;
use crate::errors::ApiError;
use crate::identity::validate_credentials;
use crate::models::Identity;
use crate::repo;

/// Handler for creating an account
///
/// This function handles POST requests to `/accounts`.
///
/// ### Returns
///
/// The new account's identity with status 201
///
/// ### Errors
///
/// `400` for a malformed email address or a short password, `409` when the
/// address is already registered
pub async fn sign_up_handler(
    State(pool): State<Arc<DbPool>>,
    payload: Result<Json<CredentialsDto>, JsonRejection>,
) -> Result<(StatusCode, Json<Identity>), ApiError> {
    let Json(payload) = payload?;
    validate_credentials(&payload.email, &payload.password)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let identity = repo::create_account(&pool, &payload.email, &payload.password)?
        .ok_or_else(|| ApiError::Conflict(payload.email.trim().to_lowercase()))?;

    Ok((StatusCode::CREATED, Json(identity)))
}

/// Handler for signing in
///
/// This function handles POST requests to `/sessions`.
///
/// ### Returns
///
/// The account's identity, or `401` when the credentials do not match
pub async fn sign_in_handler(
    State(pool): State<Arc<DbPool>>,
    payload: Result<Json<CredentialsDto>, JsonRejection>,
) -> Result<Json<Identity>, ApiError> {
    let Json(payload) = payload?;
    let identity = repo::verify_account(&pool, &payload.email, &payload.password)?
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(identity))
}
