/// Repository module
///
/// This module provides the Local Store: durable persistence for cards,
/// settings and daily review statistics. The account and document functions
/// back `flashsync-server` and run against its own database.
///
/// The diesel-facing functions in the submodules are synchronous and take a
/// connection pool, returning `anyhow` errors. `SqliteStore` wraps them behind
/// the async `LocalStore` trait, running each call on the blocking thread pool
/// and mapping failures to `AppError::Storage`.

mod account_repo;
mod card_repo;
mod document_repo;
mod setting_repo;
mod statistic_repo;

// Re-export all repository functions
pub use account_repo::*;
pub use card_repo::*;
pub use document_repo::*;
pub use setting_repo::*;
pub use statistic_repo::*;

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::instrument;

use crate::db::{self, DbPool};
use crate::errors::AppError;
use crate::models::{Card, DailyStatistic, Difficulty, Setting};

/// Durable mapping from card identifier to card, plus settings and statistics
///
/// Writes are last-writer-wins in call order: `put` overwrites any record with
/// the same id unconditionally.
pub trait LocalStore: Send + Sync + 'static {
    /// Returns every stored card
    fn get_all(&self) -> impl Future<Output = Result<Vec<Card>, AppError>> + Send;

    /// Inserts or replaces a card by id
    fn put(&self, card: &Card) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Inserts or replaces a batch of cards in one transaction
    fn put_many(&self, cards: &[Card]) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Removes a card; succeeds when no such card exists
    fn delete(&self, id: &str) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Removes every card, leaving settings and statistics in place
    fn clear(&self) -> impl Future<Output = Result<(), AppError>> + Send;

    fn get_setting(&self, key: &str) -> impl Future<Output = Result<Option<serde_json::Value>, AppError>> + Send;

    fn put_setting(&self, setting: &Setting) -> impl Future<Output = Result<(), AppError>> + Send;

    fn all_settings(&self) -> impl Future<Output = Result<Vec<Setting>, AppError>> + Send;

    /// Counts one review outcome against the given day
    fn record_review(&self, day: NaiveDate, outcome: Difficulty) -> impl Future<Output = Result<(), AppError>> + Send;

    fn all_statistics(&self) -> impl Future<Output = Result<Vec<DailyStatistic>, AppError>> + Send;
}

/// SQLite-backed `LocalStore`
#[derive(Clone)]
pub struct SqliteStore {
    pool: Arc<DbPool>,
}

impl SqliteStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database and applies migrations
    pub fn open(database_url: &str) -> Result<Self, AppError> {
        let pool = db::open_store_pool(database_url)?;
        Ok(Self::new(Arc::new(pool)))
    }

    pub fn pool(&self) -> &Arc<DbPool> {
        &self.pool
    }

    /// Runs a blocking repository call off the async executor
    async fn blocking<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&DbPool) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = Arc::clone(&self.pool);
        tokio::task::spawn_blocking(move || f(&pool))
            .await
            .map_err(AppError::storage)?
            .map_err(AppError::from)
    }
}

impl LocalStore for SqliteStore {
    #[instrument(skip(self))]
    async fn get_all(&self) -> Result<Vec<Card>, AppError> {
        let records = self.blocking(list_card_records).await?;
        records.into_iter().map(Card::try_from).collect()
    }

    #[instrument(skip(self, card), fields(card_id = %card.get_id()))]
    async fn put(&self, card: &Card) -> Result<(), AppError> {
        let card = card.clone();
        self.blocking(move |pool| upsert_card(pool, &card)).await
    }

    #[instrument(skip(self, cards), fields(count = cards.len()))]
    async fn put_many(&self, cards: &[Card]) -> Result<(), AppError> {
        let cards = cards.to_vec();
        self.blocking(move |pool| upsert_cards(pool, &cards)).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let id = id.to_string();
        self.blocking(move |pool| delete_card(pool, &id).map(|_| ())).await
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<(), AppError> {
        self.blocking(|pool| clear_cards(pool).map(|_| ())).await
    }

    #[instrument(skip(self))]
    async fn get_setting(&self, key: &str) -> Result<Option<serde_json::Value>, AppError> {
        let key = key.to_string();
        let setting = self.blocking(move |pool| get_setting(pool, &key)).await?;
        Ok(setting.map(|s| s.value))
    }

    #[instrument(skip(self, setting), fields(key = %setting.key))]
    async fn put_setting(&self, setting: &Setting) -> Result<(), AppError> {
        let setting = setting.clone();
        self.blocking(move |pool| put_setting(pool, &setting)).await
    }

    #[instrument(skip(self))]
    async fn all_settings(&self) -> Result<Vec<Setting>, AppError> {
        self.blocking(list_settings).await
    }

    #[instrument(skip(self))]
    async fn record_review(&self, day: NaiveDate, outcome: Difficulty) -> Result<(), AppError> {
        self.blocking(move |pool| record_review_outcome(pool, day, outcome)).await
    }

    #[instrument(skip(self))]
    async fn all_statistics(&self) -> Result<Vec<DailyStatistic>, AppError> {
        self.blocking(list_statistics).await
    }
}

#[cfg(test)]
pub mod tests;
