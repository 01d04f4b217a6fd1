use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use std::sync::Arc;

use crate::db::DbPool;
use crate::errors::ApiError;
use crate::models::RemoteDocument;
use crate::repo;

/// Handler for reading a user's document
///
/// This function handles GET requests to `/users/{user_id}`.
///
/// ### Returns
///
/// The stored document, or `404` if nothing was ever written for the user
pub async fn get_document_handler(
    State(pool): State<Arc<DbPool>>,
    Path(user_id): Path<String>,
) -> Result<Json<RemoteDocument>, ApiError> {
    let document = repo::get_document(&pool, &user_id)?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(document))
}

/// Handler for replacing a user's document
///
/// This function handles PUT requests to `/users/{user_id}`. A body that is
/// not a document is rejected with `400`.
pub async fn put_document_handler(
    State(pool): State<Arc<DbPool>>,
    Path(user_id): Path<String>,
    document: Result<Json<RemoteDocument>, JsonRejection>,
) -> Result<Json<RemoteDocument>, ApiError> {
    let Json(document) = document?;
    repo::replace_document(&pool, &user_id, &document)?;
    Ok(Json(document))
}

/// Handler for merge-writing a user's document
///
/// This function handles PATCH requests to `/users/{user_id}`. Fields absent
/// from the body keep their stored values.
///
/// ### Returns
///
/// The document as stored after the merge
pub async fn patch_document_handler(
    State(pool): State<Arc<DbPool>>,
    Path(user_id): Path<String>,
    update: Result<Json<RemoteDocument>, JsonRejection>,
) -> Result<Json<RemoteDocument>, ApiError> {
    let Json(update) = update?;
    let merged = repo::merge_document(&pool, &user_id, update)?;
    Ok(Json(merged))
}
