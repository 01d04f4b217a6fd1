use std::sync::Arc;

use flashsync::config::Config;
use flashsync::deck::Deck;
use flashsync::errors::AppError;
use flashsync::identity::{Identities, IdentityProvider, SESSION_SETTING};
use flashsync::models::{Identity, Setting};
use flashsync::remote::Replica;
use flashsync::repo::{LocalStore, SqliteStore};
use flashsync::sync::SyncCoordinator;
use chrono::Utc;
use tracing::debug;

/// Everything a command needs, opened once per invocation
pub struct Context {
    pub config: Config,
    pub deck: Arc<Deck<SqliteStore>>,
    pub sync: SyncCoordinator<SqliteStore, Replica>,
    pub identities: Identities,
}

impl Context {
    /// Opens the local store, seeding sample cards on first use, and resumes
    /// the saved session
    pub async fn open(config: Config) -> Result<Self, AppError> {
        let store = SqliteStore::open(&config.database_url)?;
        let deck = Arc::new(Deck::load_or_seed(store, Utc::now()).await?);

        let identities = Identities::from_config(&config);
        let session = deck
            .store()
            .get_setting(SESSION_SETTING)
            .await?
            .and_then(|value| serde_json::from_value::<Identity>(value).ok());
        debug!("Resuming session: {:?}", session.as_ref().map(|i| &i.email));
        identities.restore(session.clone());

        let sync = SyncCoordinator::new(Arc::clone(&deck), Replica::from_config(&config), config.auto_sync_interval());
        sync.set_identity(session);

        Ok(Self { config, deck, sync, identities })
    }

    /// Saves or clears the session after a sign-in or sign-out
    pub async fn save_session(&self, identity: Option<&Identity>) -> Result<(), AppError> {
        let value = match identity {
            Some(identity) => serde_json::to_value(identity)?,
            None => serde_json::Value::Null,
        };
        self.deck.store().put_setting(&Setting::new(SESSION_SETTING, value)).await?;
        self.sync.set_identity(identity.cloned());
        Ok(())
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.identities.current()
    }
}
