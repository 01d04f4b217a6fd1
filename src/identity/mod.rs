//! Identity providers: who the current user is, and how they sign in
//!
//! Every provider publishes the current identity on a `tokio::sync::watch`
//! channel, which is what the sync layer subscribes to.

mod http;
mod memory;

pub use http::HttpIdentity;
pub use memory::MemoryIdentity;

use std::future::Future;

use tokio::sync::watch;

use crate::config::{Config, RemoteKind};
use crate::errors::AppError;
use crate::models::Identity;

/// Setting under which the CLI keeps the signed-in identity between runs
pub const SESSION_SETTING: &str = "session";

/// Shortest password accepted at sign-up
pub const MIN_PASSWORD_LEN: usize = 6;

/// Checks sign-up credentials before they are sent anywhere
///
/// ### Errors
///
/// Returns `AppError::Validation` for an address without an `@` or a
/// password shorter than [`MIN_PASSWORD_LEN`] characters
pub fn validate_credentials(email: &str, password: &str) -> Result<(), AppError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation(format!("invalid email address: {:?}", email)));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {} characters", MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub trait IdentityProvider: Send + Sync + 'static {
    fn sign_up(&self, email: &str, password: &str) -> impl Future<Output = Result<Identity, AppError>> + Send;

    fn sign_in(&self, email: &str, password: &str) -> impl Future<Output = Result<Identity, AppError>> + Send;

    fn sign_out(&self) -> impl Future<Output = Result<(), AppError>> + Send;

    /// A receiver that observes every identity change
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;

    /// The identity right now, if signed in
    fn current(&self) -> Option<Identity> {
        self.subscribe().borrow().clone()
    }
}

/// An identity provider chosen at runtime from configuration
#[derive(Clone)]
pub enum Identities {
    Memory(MemoryIdentity),
    Http(HttpIdentity),
}

impl Identities {
    pub fn from_config(config: &Config) -> Self {
        match config.remote {
            RemoteKind::Memory => Identities::Memory(MemoryIdentity::new()),
            RemoteKind::Http => Identities::Http(HttpIdentity::new(config.server_url.clone())),
        }
    }

    /// Resumes a previously established session without contacting anyone
    pub fn restore(&self, identity: Option<Identity>) {
        match self {
            Identities::Memory(provider) => provider.restore(identity),
            Identities::Http(provider) => provider.restore(identity),
        }
    }
}

impl IdentityProvider for Identities {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        match self {
            Identities::Memory(provider) => provider.sign_up(email, password).await,
            Identities::Http(provider) => provider.sign_up(email, password).await,
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        match self {
            Identities::Memory(provider) => provider.sign_in(email, password).await,
            Identities::Http(provider) => provider.sign_in(email, password).await,
        }
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        match self {
            Identities::Memory(provider) => provider.sign_out().await,
            Identities::Http(provider) => provider.sign_out().await,
        }
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        match self {
            Identities::Memory(provider) => provider.subscribe(),
            Identities::Http(provider) => provider.subscribe(),
        }
    }
}
