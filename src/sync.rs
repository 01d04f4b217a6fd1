//! Push-then-pull synchronization of the deck with a remote replica
//!
//! A [`SyncCoordinator`] runs at most one sync cycle at a time. A request that
//! arrives while a cycle is running is answered with
//! [`SyncOutcome::InProgress`] straight away and does no work; nothing is
//! queued. Failures are reported to the caller and the coordinator goes back
//! to `Idle`, ready for the next attempt.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::deck::Deck;
use crate::errors::AppError;
use crate::identity::SESSION_SETTING;
use crate::models::{BACKUP_VERSION, Identity, RemoteDocument, Setting};
use crate::remote::{RemoteReplica, WriteMode};
use crate::repo::LocalStore;
use crate::task::ScheduledTask;

/// Setting that remembers whether auto-sync is on
pub const AUTO_SYNC_SETTING: &str = "autoSync";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Syncing,
    /// A cycle just failed; reverts to `Idle` as soon as it has been recorded
    Error,
}

/// What one completed sync cycle did
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    /// Cards written to the replica (zero for a pull-only cycle)
    pub pushed: usize,
    /// Cards read back from the replica
    pub pulled: usize,
    /// Remote cards new to this device
    pub added: usize,
    /// Local cards replaced by newer remote versions
    pub updated: usize,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Synced(SyncReport),
    /// Another cycle was running; nothing was done
    InProgress,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncStatus {
    pub state: SyncState,
    pub last_sync_time: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub auto_sync: bool,
}

struct Shared<S: LocalStore, R: RemoteReplica> {
    deck: Arc<Deck<S>>,
    replica: R,
    auto_sync_interval: Duration,
    status: Mutex<SyncStatus>,
    identity: Mutex<Option<Identity>>,
    auto_task: Mutex<Option<ScheduledTask>>,
    identity_watch: Mutex<Option<JoinHandle<()>>>,
}

impl<S: LocalStore, R: RemoteReplica> Drop for Shared<S, R> {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.identity_watch).take() {
            handle.abort();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Marks a cycle as running; returns the coordinator to `Idle` when dropped
struct SyncGuard<'a> {
    status: &'a Mutex<SyncStatus>,
}

impl<'a> SyncGuard<'a> {
    /// Flips `Idle` to `Syncing` in one step, or returns None if not idle
    fn try_begin(status: &'a Mutex<SyncStatus>) -> Option<Self> {
        let mut current = lock(status);
        if current.state != SyncState::Idle {
            return None;
        }
        current.state = SyncState::Syncing;
        Some(Self { status })
    }

    fn succeed(&self, at: DateTime<Utc>) {
        let mut current = lock(self.status);
        current.last_sync_time = Some(at);
        current.last_error = None;
    }

    fn fail(&self, err: &AppError) {
        let mut current = lock(self.status);
        current.state = SyncState::Error;
        current.last_error = Some(err.to_string());
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        lock(self.status).state = SyncState::Idle;
    }
}

/// Owns the sync state for one deck and one replica
///
/// Clones share the same state.
pub struct SyncCoordinator<S: LocalStore, R: RemoteReplica> {
    inner: Arc<Shared<S, R>>,
}

impl<S: LocalStore, R: RemoteReplica> Clone for SyncCoordinator<S, R> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<S: LocalStore, R: RemoteReplica> SyncCoordinator<S, R> {
    /// Creates an idle coordinator with auto-sync off and nobody signed in
    ///
    /// ### Arguments
    ///
    /// * `deck` - The application state to keep in sync
    /// * `replica` - Where user documents live
    /// * `auto_sync_interval` - Period of the auto-sync timer; must be non-zero
    pub fn new(deck: Arc<Deck<S>>, replica: R, auto_sync_interval: Duration) -> Self {
        Self {
            inner: Arc::new(Shared {
                deck,
                replica,
                auto_sync_interval,
                status: Mutex::new(SyncStatus {
                    state: SyncState::Idle,
                    last_sync_time: None,
                    last_error: None,
                    auto_sync: false,
                }),
                identity: Mutex::new(None),
                auto_task: Mutex::new(None),
                identity_watch: Mutex::new(None),
            }),
        }
    }

    pub fn deck(&self) -> &Arc<Deck<S>> {
        &self.inner.deck
    }

    pub fn replica(&self) -> &R {
        &self.inner.replica
    }

    pub fn status(&self) -> SyncStatus {
        lock(&self.inner.status).clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        lock(&self.inner.identity).clone()
    }

    /// Replaces the signed-in identity; None signs out
    pub fn set_identity(&self, identity: Option<Identity>) {
        *lock(&self.inner.identity) = identity;
    }

    fn require_identity(&self) -> Result<Identity, AppError> {
        self.identity().ok_or(AppError::NotAuthenticated)
    }

    /// Runs a full cycle: push the local collection, then pull and merge
    ///
    /// ### Returns
    ///
    /// `SyncOutcome::InProgress` if a cycle was already running, otherwise the
    /// report of the completed cycle
    ///
    /// ### Errors
    ///
    /// `AppError::NotAuthenticated` without an identity; any storage, network
    /// or serialization error from the cycle itself
    #[instrument(skip(self))]
    pub async fn sync_now(&self) -> Result<SyncOutcome, AppError> {
        let identity = self.require_identity()?;
        let Some(guard) = SyncGuard::try_begin(&self.inner.status) else {
            debug!("Sync already in progress");
            return Ok(SyncOutcome::InProgress);
        };

        let result = async {
            let pushed = self.push(&identity).await?;
            let mut report = self.pull(&identity).await?;
            report.pushed = pushed;
            Ok::<_, AppError>(report)
        }
        .await;

        self.finish(guard, result)
    }

    /// Runs a pull-only cycle: read the remote document and merge it
    ///
    /// Same gate and errors as [`SyncCoordinator::sync_now`].
    #[instrument(skip(self))]
    pub async fn pull_now(&self) -> Result<SyncOutcome, AppError> {
        let identity = self.require_identity()?;
        let Some(guard) = SyncGuard::try_begin(&self.inner.status) else {
            debug!("Sync already in progress");
            return Ok(SyncOutcome::InProgress);
        };

        let result = self.pull(&identity).await;
        self.finish(guard, result)
    }

    fn finish(&self, guard: SyncGuard<'_>, result: Result<SyncReport, AppError>) -> Result<SyncOutcome, AppError> {
        match result {
            Ok(report) => {
                guard.succeed(report.finished_at);
                info!(
                    "Sync finished: pushed {}, pulled {}, added {}, updated {}",
                    report.pushed, report.pulled, report.added, report.updated
                );
                Ok(SyncOutcome::Synced(report))
            }
            Err(err) => {
                guard.fail(&err);
                error!("Sync failed: {}", err);
                Err(err)
            }
        }
    }

    async fn push(&self, identity: &Identity) -> Result<usize, AppError> {
        let deck = &self.inner.deck;
        let cards = deck.cards().await;
        let statistics = deck.store().all_statistics().await?;
        let settings: Vec<Setting> = deck
            .store()
            .all_settings()
            .await?
            .into_iter()
            .filter(|s| s.key != SESSION_SETTING)
            .collect();

        let pushed = cards.len();
        let document = RemoteDocument {
            cards: Some(cards),
            statistics: Some(statistics),
            settings: Some(settings),
            last_modified: Some(Utc::now()),
            version: Some(BACKUP_VERSION.to_string()),
        };
        self.inner
            .replica
            .write(&identity.user_id, &document, WriteMode::Merge)
            .await?;
        debug!("Pushed {} cards", pushed);
        Ok(pushed)
    }

    async fn pull(&self, identity: &Identity) -> Result<SyncReport, AppError> {
        let remote = self.inner.replica.read(&identity.user_id).await?;
        let remote_cards = remote.as_ref().map(RemoteDocument::cards).unwrap_or(&[]);

        let mut report = SyncReport {
            pushed: 0,
            pulled: remote_cards.len(),
            added: 0,
            updated: 0,
            finished_at: Utc::now(),
        };
        if remote_cards.is_empty() {
            debug!("Remote has no cards; nothing to merge");
            return Ok(report);
        }

        let merged = self.inner.deck.merge_remote(remote_cards).await?;
        report.added = merged.added;
        report.updated = merged.updated;
        report.finished_at = Utc::now();
        Ok(report)
    }

    /// One firing of the auto-sync timer
    ///
    /// ### Returns
    ///
    /// Whether a cycle was attempted; ticks are skipped while signed out or
    /// while another cycle runs
    pub async fn auto_sync_tick(&self) -> bool {
        if self.identity().is_none() {
            debug!("Auto-sync skipped: not signed in");
            return false;
        }
        if self.status().state != SyncState::Idle {
            debug!("Auto-sync skipped: sync in progress");
            return false;
        }
        match self.sync_now().await {
            Ok(SyncOutcome::Synced(_)) => true,
            Ok(SyncOutcome::InProgress) => false,
            Err(err) => {
                warn!("Auto-sync failed: {}", err);
                true
            }
        }
    }

    /// Turns the auto-sync timer on or off and remembers the choice
    ///
    /// ### Errors
    ///
    /// `AppError::Storage` if the setting cannot be saved; the timer is left
    /// as it was
    #[instrument(skip(self))]
    pub async fn set_auto_sync(&self, enabled: bool) -> Result<(), AppError> {
        self.inner
            .deck
            .store()
            .put_setting(&Setting::new(AUTO_SYNC_SETTING, json!(enabled)))
            .await?;
        self.apply_auto_sync(enabled);
        Ok(())
    }

    /// Restores the auto-sync choice saved by a previous run
    pub async fn load_auto_sync(&self) -> Result<bool, AppError> {
        let enabled = self
            .inner
            .deck
            .store()
            .get_setting(AUTO_SYNC_SETTING)
            .await?
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        self.apply_auto_sync(enabled);
        Ok(enabled)
    }

    fn apply_auto_sync(&self, enabled: bool) {
        let mut task = lock(&self.inner.auto_task);
        lock(&self.inner.status).auto_sync = enabled;

        if !enabled {
            if let Some(running) = task.take() {
                running.cancel();
                info!("Auto-sync disabled");
            }
            return;
        }
        if task.is_some() {
            return;
        }

        let weak: Weak<Shared<S, R>> = Arc::downgrade(&self.inner);
        *task = Some(ScheduledTask::every("auto-sync", self.inner.auto_sync_interval, move || {
            let weak = weak.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    SyncCoordinator { inner }.auto_sync_tick().await;
                }
            }
        }));
        info!("Auto-sync enabled every {:?}", self.inner.auto_sync_interval);
    }

    /// Follows an identity provider's changes in the background
    ///
    /// Each change replaces the coordinator's identity. When a different user
    /// signs in while auto-sync is on, one pull-only catch-up runs. The
    /// current value of the channel counts as a change.
    pub fn watch_identity(&self, mut identities: watch::Receiver<Option<Identity>>) {
        let weak: Weak<Shared<S, R>> = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            loop {
                let next = identities.borrow_and_update().clone();
                let Some(inner) = weak.upgrade() else { break };
                let coordinator = SyncCoordinator { inner };

                let previous = coordinator.identity().map(|i| i.user_id);
                let new_user = next.as_ref().is_some_and(|i| Some(&i.user_id) != previous.as_ref());
                coordinator.set_identity(next);

                if new_user && coordinator.status().auto_sync {
                    info!("New sign-in; pulling remote cards");
                    if let Err(err) = coordinator.pull_now().await {
                        warn!("Catch-up pull failed: {}", err);
                    }
                }
                drop(coordinator);

                if identities.changed().await.is_err() {
                    break;
                }
            }
        });

        if let Some(previous) = lock(&self.inner.identity_watch).replace(handle) {
            previous.abort();
        }
    }
}
