use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use super::{IdentityProvider, validate_credentials};
use crate::errors::AppError;
use crate::models::Identity;

struct Account {
    user_id: String,
    password: String,
}

/// In-process identity provider with its own account table
///
/// Clones share accounts and the current identity.
#[derive(Clone)]
pub struct MemoryIdentity {
    accounts: Arc<Mutex<HashMap<String, Account>>>,
    current: Arc<watch::Sender<Option<Identity>>>,
}

impl Default for MemoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIdentity {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            accounts: Arc::new(Mutex::new(HashMap::new())),
            current: Arc::new(current),
        }
    }

    /// A provider that starts out signed in as `identity`
    pub fn signed_in(identity: Identity) -> Self {
        let provider = Self::new();
        provider.restore(Some(identity));
        provider
    }

    /// Replaces the current identity, notifying subscribers
    pub fn restore(&self, identity: Option<Identity>) {
        self.current.send_replace(identity);
    }

    fn accounts(&self) -> std::sync::MutexGuard<'_, HashMap<String, Account>> {
        self.accounts.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl IdentityProvider for MemoryIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        validate_credentials(email, password)?;
        let email = email.trim().to_lowercase();

        let identity = {
            let mut accounts = self.accounts();
            if accounts.contains_key(&email) {
                return Err(AppError::Auth(format!("account already exists: {}", email)));
            }
            let user_id = Uuid::new_v4().to_string();
            accounts.insert(email.clone(), Account { user_id: user_id.clone(), password: password.to_string() });
            Identity::new(user_id, email)
        };

        info!("Signed up {}", identity.email);
        self.restore(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        let email = email.trim().to_lowercase();
        let identity = {
            let accounts = self.accounts();
            match accounts.get(&email) {
                Some(account) if account.password == password => Identity::new(account.user_id.clone(), email),
                _ => return Err(AppError::Auth("invalid email or password".to_string())),
            }
        };

        info!("Signed in {}", identity.email);
        self.restore(Some(identity.clone()));
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
