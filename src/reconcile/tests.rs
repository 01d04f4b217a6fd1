use super::*;
use chrono::{DateTime, Duration, TimeZone, Utc};

fn t(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap() + Duration::minutes(minutes)
}

fn card(id: &str, answer: &str, modified: DateTime<Utc>) -> Card {
    Card::new_with_fields(id.to_string(), "Q".to_string(), answer.to_string(), None, t(0), modified)
}

#[test]
fn test_tie_keeps_local() {
    let local = card("1", "local", t(10));
    let remote = card("1", "remote", t(10));

    let merged = merge_cards(&[local.clone()], &[remote]);
    assert_eq!(merged, vec![local]);
}

#[test]
fn test_newer_remote_wins() {
    let local = card("1", "local", t(10));
    let remote = card("1", "remote", t(11));

    let result = reconcile(&[local], &[remote.clone()]);
    assert_eq!(result.cards, vec![remote]);
    assert_eq!(result.updated, 1);
    assert_eq!(result.added, 0);
}

#[test]
fn test_older_remote_loses() {
    let local = card("1", "local", t(10));
    let remote = card("1", "remote", t(9));

    assert_eq!(merge_cards(&[local.clone()], &[remote]), vec![local]);
}

#[test]
fn test_remote_only_cards_are_appended() {
    let a = card("a", "x", t(1));
    let b = card("b", "x", t(1));
    let c = card("c", "x", t(1));

    let result = reconcile(&[a.clone(), b.clone()], &[c.clone(), a.clone()]);
    assert_eq!(result.cards, vec![a, b, c]);
    assert_eq!(result.added, 1);
    assert_eq!(result.updated, 0);
}

#[test]
fn test_merge_with_empty_is_identity() {
    let cards = vec![card("a", "x", t(1)), card("b", "y", t(2))];
    assert_eq!(merge_cards(&cards, &[]), cards);
    assert_eq!(merge_cards(&[], &cards), cards);
}

#[test]
fn test_merge_with_self_is_identity() {
    let cards = vec![card("a", "x", t(1)), card("b", "y", t(2))];
    assert_eq!(merge_cards(&cards, &cards), cards);
}

#[test]
fn test_duplicate_local_ids_keep_later_entry() {
    let first = card("a", "first", t(1));
    let second = card("a", "second", t(1));

    assert_eq!(merge_cards(&[first, second.clone()], &[]), vec![second]);
}
