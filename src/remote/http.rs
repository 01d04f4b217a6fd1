use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use super::{RemoteReplica, WriteMode};
use crate::errors::AppError;
use crate::models::RemoteDocument;

/// Checks a response for an error status and extracts the server's message
pub(crate) trait ResponseExt {
    async fn check(self) -> Result<reqwest::Response, AppError>;
}

impl ResponseExt for reqwest::Response {
    async fn check(self) -> Result<reqwest::Response, AppError> {
        if self.status().is_success() {
            return Ok(self);
        }
        let status = self.status();
        let message = match self.json::<serde_json::Value>().await {
            Ok(body) => body.get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("Unknown error")
                .to_string(),
            Err(_) => format!("HTTP {}", status),
        };
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::CONFLICT => AppError::Auth(message),
            StatusCode::BAD_REQUEST => AppError::Validation(message),
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            _ => AppError::Network(format!("server error ({}): {}", status.as_u16(), message)),
        })
    }
}

/// Replica backed by a `flashsync-server` instance
#[derive(Clone)]
pub struct HttpReplica {
    /// The base URL of the server (e.g. "http://localhost:3000")
    base_url: String,
    client: Client,
}

impl HttpReplica {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn document_url(&self, user_id: &str) -> String {
        format!("{}/users/{}", self.base_url, user_id)
    }
}

impl RemoteReplica for HttpReplica {
    #[instrument(skip(self, document))]
    async fn write(&self, user_id: &str, document: &RemoteDocument, mode: WriteMode) -> Result<(), AppError> {
        let url = self.document_url(user_id);
        let request = match mode {
            WriteMode::Merge => self.client.patch(&url),
            WriteMode::Replace => self.client.put(&url),
        };
        request.json(document).send().await?.check().await?;
        debug!("Wrote remote document");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn read(&self, user_id: &str) -> Result<Option<RemoteDocument>, AppError> {
        let resp = self.client.get(self.document_url(user_id)).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let document = resp.check().await?.json::<RemoteDocument>().await?;
        Ok(Some(document))
    }
}
