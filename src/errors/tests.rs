use super::*;
use axum::body::to_bytes;
use axum::response::IntoResponse;

/// Helper to extract status code and body JSON from an ApiError response
async fn error_response(error: ApiError) -> (StatusCode, serde_json::Value) {
    let response = error.into_response();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_database_error_response_hides_details() {
    let error = ApiError::Database(anyhow::anyhow!("disk I/O error"));
    let (status, body) = error_response(error).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn test_not_found_response() {
    let (status, body) = error_response(ApiError::NotFound).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Document not found");
}

#[tokio::test]
async fn test_bad_request_response() {
    let msg = "Password must be at least 6 characters".to_string();
    let (status, body) = error_response(ApiError::BadRequest(msg.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], msg);
}

#[tokio::test]
async fn test_unauthorized_response() {
    let (status, body) = error_response(ApiError::Unauthorized).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_conflict_response() {
    let (status, body) = error_response(ApiError::Conflict("a@example.com".to_string())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Account already exists: a@example.com");
}

#[test]
fn test_anyhow_converts_to_storage_error() {
    let err: AppError = anyhow::anyhow!("database is locked").into();
    assert!(matches!(err, AppError::Storage(ref msg) if msg.contains("database is locked")));
}

#[test]
fn test_app_error_messages() {
    assert_eq!(AppError::NotAuthenticated.to_string(), "Not signed in");
    assert_eq!(
        AppError::InvalidOutcome("meh".to_string()).to_string(),
        "Invalid outcome: meh"
    );
}
