use super::*;
use crate::repo::tests::setup_test_store;
use chrono::TimeZone;
use serde_json::json;
use tempfile::tempdir;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap()
}

async fn empty_deck() -> Deck<crate::repo::SqliteStore> {
    Deck::load(setup_test_store()).await.unwrap()
}

#[tokio::test]
async fn test_export_backup_contents() {
    let deck = empty_deck().await;
    let card = deck.add_card("Hello", "こんにちは", Some("語学".to_string()), now()).await.unwrap();
    deck.review(card.get_id(), Difficulty::Perfect, now()).await.unwrap();
    deck.store().put_setting(&Setting::new("theme", json!("dark"))).await.unwrap();
    deck.store().put_setting(&Setting::new(SESSION_SETTING, json!({"userId": "u"}))).await.unwrap();

    let backup = export_backup(&deck, now()).await.unwrap();

    assert_eq!(backup.cards.len(), 1);
    assert_eq!(backup.version, "1.0.0");
    assert_eq!(backup.timestamp, now().timestamp_millis());
    assert_eq!(backup.statistics.unwrap()[0].perfect, 1);
    assert_eq!(backup.settings.unwrap(), vec![Setting::new("theme", json!("dark"))]);
}

#[tokio::test]
async fn test_restore_skips_invalid_records() {
    let deck = empty_deck().await;
    let document = json!({
        "cards": [
            {
                "id": "c1",
                "question": "Hello",
                "answer": "こんにちは",
                "category": "語学",
                "createdAt": "2025-01-01T00:00:00Z",
                "lastModified": "2025-01-01T00:00:00Z",
                "nextReview": "2025-01-08T00:00:00Z",
                "reviewCount": 2,
                "difficulty": "remembered"
            },
            { "id": "c2", "question": "No answer" }
        ],
        "timestamp": 1735689600000i64,
        "version": "1.0.0"
    });

    let report = restore_backup(&deck, &document.to_string(), now()).await.unwrap();
    assert_eq!(report.restored, 1);
    assert_eq!(report.skipped, 1);

    let stored = deck.store().get_all().await.unwrap();
    assert_eq!(stored.len(), 1);
    let card = &stored[0];
    assert_eq!(card.get_id(), "c1");
    assert_eq!(card.get_last_modified(), now());
    assert_eq!(card.get_review_count(), 2);
    assert_eq!(card.get_difficulty(), Some(Difficulty::Remembered));
    assert_eq!(card.get_next_review(), Some(Utc.with_ymd_and_hms(2025, 1, 8, 0, 0, 0).unwrap()));
    assert_eq!(deck.cards().await, stored);
}

#[tokio::test]
async fn test_restore_fills_missing_optional_fields() {
    let deck = empty_deck().await;
    let document = json!({ "cards": [{ "id": "c1", "question": "Q", "answer": "A" }] });

    restore_backup(&deck, &document.to_string(), now()).await.unwrap();

    let card = deck.get("c1").await.unwrap();
    assert_eq!(card.get_created_at(), now());
    assert_eq!(card.get_next_review(), Some(now()));
    assert_eq!(card.get_review_count(), 0);
    assert_eq!(card.get_category(), None);
}

#[tokio::test]
async fn test_restore_keeps_cards_with_malformed_optional_fields() {
    let deck = empty_deck().await;
    let document = json!({
        "cards": [
            { "id": "c1", "question": "Q", "answer": "A", "createdAt": "2024-01-01" },
            { "id": "c2", "question": "Q", "answer": "A", "reviewCount": -1 },
            { "id": "c3", "question": "Q", "answer": "A", "difficulty": "easy", "category": 5 },
            { "id": "c4", "question": "Q" }
        ]
    });

    let report = restore_backup(&deck, &document.to_string(), now()).await.unwrap();
    assert_eq!(report, RestoreReport { restored: 3, skipped: 1, settings: 0 });

    let c1 = deck.get("c1").await.unwrap();
    assert_eq!(c1.get_created_at(), now());
    assert_eq!(deck.get("c2").await.unwrap().get_review_count(), 0);
    let c3 = deck.get("c3").await.unwrap();
    assert_eq!(c3.get_difficulty(), None);
    assert_eq!(c3.get_category(), None);
    assert!(deck.get("c4").await.is_none());
}

#[tokio::test]
async fn test_restore_skips_records_without_required_text() {
    let deck = empty_deck().await;
    let document = json!({
        "cards": [
            { "id": "", "question": "Q", "answer": "A" },
            { "id": 7, "question": "Q", "answer": "A" },
            { "id": "c1", "question": "  ", "answer": "A" },
            "not a card"
        ]
    });

    let report = restore_backup(&deck, &document.to_string(), now()).await.unwrap();
    assert_eq!(report, RestoreReport { restored: 0, skipped: 4, settings: 0 });
    assert!(deck.cards().await.is_empty());
}

#[tokio::test]
async fn test_restore_overwrites_existing_card() {
    let deck = empty_deck().await;
    let existing = deck.add_card("Q", "old", None, now()).await.unwrap();
    let document = json!({ "cards": [{ "id": existing.get_id(), "question": "Q", "answer": "new" }] });

    let later = now() + chrono::Duration::hours(1);
    restore_backup(&deck, &document.to_string(), later).await.unwrap();

    let cards = deck.cards().await;
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].get_answer(), "new");
    assert_eq!(cards[0].get_last_modified(), later);
}

#[tokio::test]
async fn test_restore_settings_but_not_session() {
    let deck = empty_deck().await;
    let document = json!({
        "cards": [],
        "settings": [
            { "key": "autoFlip", "value": true },
            { "key": SESSION_SETTING, "value": { "userId": "someone-else" } },
            { "nokey": 1 }
        ]
    });

    let report = restore_backup(&deck, &document.to_string(), now()).await.unwrap();
    assert_eq!(report.settings, 1);
    assert_eq!(deck.store().get_setting("autoFlip").await.unwrap(), Some(json!(true)));
    assert_eq!(deck.store().get_setting(SESSION_SETTING).await.unwrap(), None);
}

#[tokio::test]
async fn test_restore_rejects_non_backup() {
    let deck = empty_deck().await;

    let err = restore_backup(&deck, "{ not json", now()).await.unwrap_err();
    assert!(matches!(err, AppError::Serialization(_)));

    let err = restore_backup(&deck, r#"{"items": []}"#, now()).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_backup_round_trip_through_json() {
    let source = empty_deck().await;
    source.add_card("Hello", "こんにちは", Some("語学".to_string()), now()).await.unwrap();
    source.add_card("Thank you", "ありがとう", None, now()).await.unwrap();
    let json = serde_json::to_string(&export_backup(&source, now()).await.unwrap()).unwrap();

    let target = empty_deck().await;
    let report = restore_backup(&target, &json, now()).await.unwrap();

    assert_eq!(report.restored, 2);
    assert_eq!(target.cards().await, source.cards().await);
}

#[test]
fn test_export_csv_quotes_every_field() {
    let mut card = Card::new("Say \"hi\"".to_string(), "a, b".to_string(), Some("語学".to_string()), now());
    card.set_review_count(3);

    let csv = export_csv(&[card]).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], r#""問題","答え","カテゴリ","作成日","復習回数","次回復習日""#);
    assert_eq!(lines[1], r#""Say ""hi""","a, b","語学","2025-03-14","3","2025-03-14""#);
}

#[test]
fn test_csv_round_trip() {
    let cards = vec![
        Card::new("Hello".to_string(), "こんにちは".to_string(), Some("語学".to_string()), now()),
        Card::new("He said \"yes\"".to_string(), "line one\nline two".to_string(), Some("資格".to_string()), now()),
    ];

    let parsed = parse_csv(&export_csv(&cards).unwrap());

    assert_eq!(parsed.skipped, 0);
    let triples: Vec<_> = parsed.rows.iter().map(|r| (r.question.as_str(), r.answer.as_str(), r.category.as_str())).collect();
    assert_eq!(triples, vec![
        ("Hello", "こんにちは", "語学"),
        ("He said \"yes\"", "line one\nline two", "資格"),
    ]);
}

#[test]
fn test_parse_csv_skips_short_rows() {
    let text = "question,answer,category,created,count,next\n\
                \"Q1\",\"A1\",,2025-01-01,4,2025-01-02\n\
                only-question\n\
                \"\",\"A\"\n\
                \n\
                Q2,A2,プログラミング,,many\n";

    let parsed = parse_csv(text);

    assert_eq!(parsed.skipped, 2);
    assert_eq!(parsed.rows, vec![
        CsvRow { question: "Q1".to_string(), answer: "A1".to_string(), category: UNCATEGORIZED.to_string(), review_count: 4 },
        CsvRow { question: "Q2".to_string(), answer: "A2".to_string(), category: "プログラミング".to_string(), review_count: 0 },
    ]);
}

#[tokio::test]
async fn test_restore_csv_adds_new_cards() {
    let deck = empty_deck().await;
    let text = "問題,答え,カテゴリ\n\"Hello\",\"こんにちは\",\"語学\"\nbroken\n";

    let report = restore_csv(&deck, text, now()).await.unwrap();
    assert_eq!(report.restored, 1);
    assert_eq!(report.skipped, 1);

    let cards = deck.store().get_all().await.unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].get_category(), Some("語学"));
    assert_eq!(cards[0].get_next_review(), Some(now()));
}

#[tokio::test]
async fn test_backup_files_rotate() {
    let dir = tempdir().unwrap();
    let deck = empty_deck().await;
    deck.add_card("Q", "A", None, now()).await.unwrap();

    let mut written = Vec::new();
    for minute in 0..5 {
        let at = now() + chrono::Duration::minutes(minute);
        written.push(write_backup_file(&deck, dir.path(), at).await.unwrap());
    }
    std::fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

    let removed = rotate_backups(dir.path(), 2).await.unwrap();
    assert_eq!(removed.len(), 3);

    let remaining = list_backups(dir.path()).await.unwrap();
    assert_eq!(remaining, vec![written[4].clone(), written[3].clone()]);
    assert!(dir.path().join("notes.txt").exists());

    let json = std::fs::read_to_string(&remaining[0]).unwrap();
    let restored = restore_backup(&empty_deck().await, &json, now()).await.unwrap();
    assert_eq!(restored.restored, 1);
}

#[tokio::test]
async fn test_list_backups_missing_dir() {
    let dir = tempdir().unwrap();
    assert!(list_backups(&dir.path().join("absent")).await.unwrap().is_empty());
}
