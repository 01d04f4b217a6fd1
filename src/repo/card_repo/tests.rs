use super::*;
use crate::repo::tests::setup_test_db;
use chrono::{Duration, TimeZone, Utc};

fn card_at(question: &str, minutes: i64) -> Card {
    let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes);
    Card::new(question.to_string(), "answer".to_string(), Some("語学".to_string()), created)
}

#[test]
fn test_upsert_and_get_card_record() {
    let pool = setup_test_db();
    let card = card_at("Hello", 0);

    upsert_card(&pool, &card).unwrap();

    let record = get_card_record(&pool, card.get_id()).unwrap().unwrap();
    assert_eq!(record, CardRecord::from(&card));
    assert!(get_card_record(&pool, "missing").unwrap().is_none());
}

#[test]
fn test_list_orders_by_creation_time() {
    let pool = setup_test_db();
    let late = card_at("late", 10);
    let early = card_at("early", 1);

    upsert_card(&pool, &late).unwrap();
    upsert_card(&pool, &early).unwrap();

    let ids: Vec<String> = list_card_records(&pool).unwrap().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![early.get_id().to_string(), late.get_id().to_string()]);
}

#[test]
fn test_timestamps_survive_storage_exactly() {
    let pool = setup_test_db();
    let mut card = card_at("precise", 0);
    card.set_last_modified(Utc::now());

    upsert_card(&pool, &card).unwrap();

    let stored = Card::try_from(get_card_record(&pool, card.get_id()).unwrap().unwrap()).unwrap();
    assert_eq!(stored.get_last_modified(), card.get_last_modified());
}

#[test]
fn test_delete_reports_whether_removed() {
    let pool = setup_test_db();
    let card = card_at("q", 0);
    upsert_card(&pool, &card).unwrap();

    assert!(delete_card(&pool, card.get_id()).unwrap());
    assert!(!delete_card(&pool, card.get_id()).unwrap());
}

#[test]
fn test_clear_cards_counts_rows() {
    let pool = setup_test_db();
    upsert_cards(&pool, &[card_at("a", 0), card_at("b", 1)]).unwrap();

    assert_eq!(clear_cards(&pool).unwrap(), 2);
    assert!(list_card_records(&pool).unwrap().is_empty());
}
