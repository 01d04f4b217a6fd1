use std::sync::Arc;

use reqwest::Client;
use tokio::sync::watch;
use tracing::{info, instrument};

use super::{IdentityProvider, validate_credentials};
use crate::dto::CredentialsDto;
use crate::errors::AppError;
use crate::models::Identity;
use crate::remote::http::ResponseExt;

/// Identity provider backed by the account routes of `flashsync-server`
#[derive(Clone)]
pub struct HttpIdentity {
    base_url: String,
    client: Client,
    current: Arc<watch::Sender<Option<Identity>>>,
}

impl HttpIdentity {
    pub fn new(base_url: String) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            current: Arc::new(current),
        }
    }

    /// Replaces the current identity, notifying subscribers
    pub fn restore(&self, identity: Option<Identity>) {
        self.current.send_replace(identity);
    }

    async fn post_credentials(&self, path: &str, email: &str, password: &str) -> Result<Identity, AppError> {
        let url = format!("{}{}", self.base_url, path);
        let identity = self.client
            .post(&url)
            .json(&CredentialsDto { email: email.trim().to_string(), password: password.to_string() })
            .send()
            .await?
            .check()
            .await?
            .json::<Identity>()
            .await?;
        self.restore(Some(identity.clone()));
        Ok(identity)
    }
}

impl IdentityProvider for HttpIdentity {
    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        validate_credentials(email, password)?;
        let identity = self.post_credentials("/accounts", email, password).await?;
        info!("Signed up {}", identity.email);
        Ok(identity)
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        let identity = self.post_credentials("/sessions", email, password).await?;
        info!("Signed in {}", identity.email);
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        self.restore(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }
}
