//! Shared proptest strategies and store doubles for unit tests

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;

use crate::errors::AppError;
use crate::models::{Card, DailyStatistic, Difficulty, Setting};
use crate::repo::{LocalStore, SqliteStore};

/// Generates an arbitrary DateTime<Utc> within 2020-01-01 to 2030-01-01
pub fn arb_datetime_utc() -> impl Strategy<Value = DateTime<Utc>> {
    (1_577_836_800i64..1_893_456_000i64)
        .prop_map(|ts| DateTime::from_timestamp(ts, 0).unwrap())
}

/// Generates an optional arbitrary DateTime<Utc>
pub fn arb_optional_datetime_utc() -> impl Strategy<Value = Option<DateTime<Utc>>> {
    prop_oneof![
        Just(None),
        arb_datetime_utc().prop_map(Some),
    ]
}

/// Generates an arbitrary review outcome
pub fn arb_difficulty() -> impl Strategy<Value = Difficulty> {
    prop_oneof![
        Just(Difficulty::Forgot),
        Just(Difficulty::Unsure),
        Just(Difficulty::Remembered),
        Just(Difficulty::Perfect),
    ]
}

/// Generates a collection of cards with unique ids
///
/// Ids come from a pool of eight and modification times from a four-minute
/// window, so two generated sets overlap often and tie regularly.
pub fn arb_card_set() -> impl Strategy<Value = Vec<Card>> {
    let ids: Vec<String> = (0..8).map(|i| format!("card-{}", i)).collect();
    let base = Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap();

    prop::sample::subsequence(ids, 0..=8)
        .prop_flat_map(|ids| {
            let n = ids.len();
            (Just(ids), prop::collection::vec((0i64..4, "[a-z]{1,6}"), n))
        })
        .prop_map(move |(ids, fields)| {
            ids.into_iter()
                .zip(fields)
                .map(|(id, (minute, answer))| {
                    Card::new_with_fields(
                        id,
                        "Q".to_string(),
                        answer,
                        None,
                        base,
                        base + Duration::minutes(minute),
                    )
                })
                .collect()
        })
}

/// A `LocalStore` whose writes can be switched to fail
///
/// Reads always go to the wrapped store.
#[derive(Clone)]
pub struct FlakyStore {
    inner: SqliteStore,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn new(inner: SqliteStore) -> Self {
        Self { inner, fail_writes: Default::default() }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Storage("disk full".to_string()));
        }
        Ok(())
    }
}

impl LocalStore for FlakyStore {
    async fn get_all(&self) -> Result<Vec<Card>, AppError> {
        self.inner.get_all().await
    }

    async fn put(&self, card: &Card) -> Result<(), AppError> {
        self.check()?;
        self.inner.put(card).await
    }

    async fn put_many(&self, cards: &[Card]) -> Result<(), AppError> {
        self.check()?;
        self.inner.put_many(cards).await
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.check()?;
        self.inner.delete(id).await
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.check()?;
        self.inner.clear().await
    }

    async fn get_setting(&self, key: &str) -> Result<Option<serde_json::Value>, AppError> {
        self.inner.get_setting(key).await
    }

    async fn put_setting(&self, setting: &Setting) -> Result<(), AppError> {
        self.check()?;
        self.inner.put_setting(setting).await
    }

    async fn all_settings(&self) -> Result<Vec<Setting>, AppError> {
        self.inner.all_settings().await
    }

    async fn record_review(&self, day: NaiveDate, outcome: Difficulty) -> Result<(), AppError> {
        self.check()?;
        self.inner.record_review(day, outcome).await
    }

    async fn all_statistics(&self) -> Result<Vec<DailyStatistic>, AppError> {
        self.inner.all_statistics().await
    }
}
