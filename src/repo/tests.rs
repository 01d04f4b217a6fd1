use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};

use super::*;
use crate::db::{self, DbPool};

/// Sets up a test database with the store migrations applied
///
/// Plain ":memory:" gives each connection its own separate database, so the
/// pool uses a unique URI with cache=shared: every connection in the pool sees
/// the same in-memory database while tests stay isolated from each other.
///
/// ### Returns
///
/// A database connection pool connected to the in-memory database
pub fn setup_test_db() -> Arc<DbPool> {
    let unique_id = uuid::Uuid::new_v4();
    let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
    let pool = db::open_store_pool(&database_url).expect("Failed to open test database");
    Arc::new(pool)
}

/// Sets up a `SqliteStore` over a fresh in-memory database
pub fn setup_test_store() -> SqliteStore {
    SqliteStore::new(setup_test_db())
}

fn sample_card(question: &str, minutes: i64) -> Card {
    let created = Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap() + Duration::minutes(minutes);
    Card::new(question.to_string(), format!("{} answer", question), None, created)
}

#[tokio::test]
async fn test_store_put_then_get_all() {
    let store = setup_test_store();
    let first = sample_card("first", 0);
    let second = sample_card("second", 5);

    store.put(&second).await.unwrap();
    store.put(&first).await.unwrap();

    let cards = store.get_all().await.unwrap();
    assert_eq!(cards, vec![first, second]);
}

#[tokio::test]
async fn test_store_put_overwrites_unconditionally() {
    let store = setup_test_store();
    let mut card = sample_card("q", 0);
    store.put(&card).await.unwrap();

    // An older lastModified still wins because it was written last
    card.set_answer("rewritten".to_string());
    card.set_last_modified(card.get_last_modified() - Duration::days(1));
    store.put(&card).await.unwrap();

    let cards = store.get_all().await.unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].get_answer(), "rewritten");
    assert_eq!(cards[0].get_last_modified(), card.get_last_modified());
}

#[tokio::test]
async fn test_store_delete_missing_is_ok() {
    let store = setup_test_store();
    let card = sample_card("q", 0);
    store.put(&card).await.unwrap();

    store.delete(card.get_id()).await.unwrap();
    store.delete(card.get_id()).await.unwrap();
    store.delete("never-existed").await.unwrap();

    assert!(store.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_store_clear_keeps_settings() {
    let store = setup_test_store();
    store.put(&sample_card("a", 0)).await.unwrap();
    store.put(&sample_card("b", 1)).await.unwrap();
    store.put_setting(&Setting::new("theme", serde_json::json!("dark"))).await.unwrap();

    store.clear().await.unwrap();

    assert!(store.get_all().await.unwrap().is_empty());
    assert_eq!(store.get_setting("theme").await.unwrap(), Some(serde_json::json!("dark")));
}

#[tokio::test]
async fn test_store_put_many() {
    let store = setup_test_store();
    let cards = vec![sample_card("a", 0), sample_card("b", 1), sample_card("c", 2)];

    store.put_many(&cards).await.unwrap();

    assert_eq!(store.get_all().await.unwrap(), cards);
}

#[tokio::test]
async fn test_store_settings_roundtrip() {
    let store = setup_test_store();
    assert_eq!(store.get_setting("autoSync").await.unwrap(), None);

    store.put_setting(&Setting::new("autoSync", serde_json::json!(true))).await.unwrap();
    store.put_setting(&Setting::new("autoSync", serde_json::json!(false))).await.unwrap();
    store.put_setting(&Setting::new("autoFlip", serde_json::json!(true))).await.unwrap();

    assert_eq!(store.get_setting("autoSync").await.unwrap(), Some(serde_json::json!(false)));
    let keys: Vec<String> = store.all_settings().await.unwrap().into_iter().map(|s| s.key).collect();
    assert_eq!(keys, vec!["autoFlip".to_string(), "autoSync".to_string()]);
}

#[tokio::test]
async fn test_store_records_statistics_per_day() {
    let store = setup_test_store();
    let day1 = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
    let day2 = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();

    store.record_review(day2, Difficulty::Perfect).await.unwrap();
    store.record_review(day1, Difficulty::Forgot).await.unwrap();
    store.record_review(day1, Difficulty::Forgot).await.unwrap();

    let stats = store.all_statistics().await.unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].date, day1);
    assert_eq!(stats[0].forgot, 2);
    assert_eq!(stats[1].date, day2);
    assert_eq!(stats[1].perfect, 1);
}
