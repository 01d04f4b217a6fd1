//! Backups: the JSON interchange document, CSV export and import, and
//! rotating automatic backup files

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::deck::Deck;
use crate::errors::AppError;
use crate::identity::SESSION_SETTING;
use crate::models::{BACKUP_VERSION, BackupDocument, Card, Difficulty, Setting};
use crate::repo::LocalStore;
use crate::scheduler::UNCATEGORIZED;
use crate::task::ScheduledTask;

/// Column headings of the CSV export
pub const CSV_HEADERS: [&str; 6] = ["問題", "答え", "カテゴリ", "作成日", "復習回数", "次回復習日"];

const BACKUP_FILE_PREFIX: &str = "flashsync-backup-";

/// How many records an import took and how many it passed over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub restored: usize,
    pub skipped: usize,
    pub settings: usize,
}

/// Builds the interchange document for everything in the deck
///
/// The signed-in session is left out.
#[instrument(skip(deck))]
pub async fn export_backup<S: LocalStore>(deck: &Deck<S>, now: DateTime<Utc>) -> Result<BackupDocument, AppError> {
    let cards = deck.cards().await;
    let statistics = deck.store().all_statistics().await?;
    let settings = deck
        .store()
        .all_settings()
        .await?
        .into_iter()
        .filter(|s| s.key != SESSION_SETTING)
        .collect();

    info!("Exported {} cards", cards.len());
    Ok(BackupDocument {
        cards,
        statistics: Some(statistics),
        settings: Some(settings),
        timestamp: now.timestamp_millis(),
        version: BACKUP_VERSION.to_string(),
    })
}

/// A required text field: present, a string, and not blank
fn required_text(record: &Value, key: &str) -> Option<String> {
    record
        .get(key)?
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// An optional field; a missing or unreadable value counts as absent
fn optional<T: DeserializeOwned>(record: &Value, key: &str) -> Option<T> {
    record
        .get(key)
        .and_then(|value| T::deserialize(value).ok())
}

/// Turns an imported record into a card modified at `now`
///
/// Only `id`, `question` and `answer` decide whether the record is usable.
/// Other fields fall back to their defaults when missing or malformed.
fn card_from_record(record: &Value, now: DateTime<Utc>) -> Option<Card> {
    let id = required_text(record, "id")?;
    let question = required_text(record, "question")?;
    let answer = required_text(record, "answer")?;

    let created_at = optional(record, "createdAt").unwrap_or(now);
    let mut card = Card::new_with_fields(id, question, answer, optional(record, "category"), created_at, now);
    card.set_last_review(optional(record, "lastReview"));
    card.set_next_review(Some(optional(record, "nextReview").unwrap_or(now)));
    card.set_review_count(optional(record, "reviewCount").unwrap_or(0));
    card.set_difficulty(optional::<Difficulty>(record, "difficulty"));
    Some(card)
}

/// Restores cards and settings from an interchange document
///
/// Each card must carry a non-empty `id`, `question` and `answer`; records
/// that don't are skipped and counted. Restored cards overwrite cards with the
/// same id and get `lastModified = now`.
///
/// ### Errors
///
/// `AppError::Serialization` if `json` is not JSON, `AppError::Validation` if
/// it has no `cards` array, and `AppError::Storage` if saving fails
#[instrument(skip(deck, json))]
pub async fn restore_backup<S: LocalStore>(
    deck: &Deck<S>,
    json: &str,
    now: DateTime<Utc>,
) -> Result<RestoreReport, AppError> {
    let document: Value = serde_json::from_str(json)?;
    let records = document
        .get("cards")
        .and_then(|c| c.as_array())
        .ok_or_else(|| AppError::Validation("backup has no cards array".to_string()))?;

    let mut report = RestoreReport::default();
    let mut cards = Vec::with_capacity(records.len());
    for record in records {
        match card_from_record(record, now) {
            Some(card) => cards.push(card),
            None => {
                debug!("Skipping invalid card record");
                report.skipped += 1;
            }
        }
    }
    report.restored = cards.len();
    deck.upsert_cards(cards).await?;

    if let Some(settings) = document.get("settings").and_then(|s| s.as_array()) {
        for value in settings {
            let Ok(setting) = serde_json::from_value::<Setting>(value.clone()) else {
                continue;
            };
            if setting.key == SESSION_SETTING {
                continue;
            }
            deck.store().put_setting(&setting).await?;
            report.settings += 1;
        }
    }

    info!("Restored {} cards, skipped {}", report.restored, report.skipped);
    Ok(report)
}

fn format_date(at: DateTime<Utc>) -> String {
    at.date_naive().format("%Y-%m-%d").to_string()
}

/// Writes `cards` as CSV with every field quoted
pub fn export_csv(cards: &[Card]) -> Result<String, AppError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for card in cards {
        writer.write_record([
            card.get_question().to_string(),
            card.get_answer().to_string(),
            card.get_category().unwrap_or_default().to_string(),
            format_date(card.get_created_at()),
            card.get_review_count().to_string(),
            card.get_next_review().map(format_date).unwrap_or_default(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| AppError::storage(e.error()))?;
    String::from_utf8(bytes).map_err(|e| AppError::Validation(e.to_string()))
}

/// One usable row of an imported CSV file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub question: String,
    pub answer: String,
    pub category: String,
    pub review_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCsv {
    pub rows: Vec<CsvRow>,
    /// Rows without a question and an answer, or that failed to parse
    pub skipped: usize,
}

/// Parses CSV in the export's layout; the first row is a header
///
/// Only the question and answer columns are required. A missing category
/// becomes [`UNCATEGORIZED`] and an unreadable review count becomes zero.
pub fn parse_csv(text: &str) -> ParsedCsv {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut parsed = ParsedCsv::default();
    for result in reader.records() {
        let Ok(record) = result else {
            parsed.skipped += 1;
            continue;
        };
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let field = |i: usize| record.get(i).map(str::trim).unwrap_or_default();
        let (question, answer) = (field(0), field(1));
        if question.is_empty() || answer.is_empty() {
            parsed.skipped += 1;
            continue;
        }

        let category = match field(2) {
            "" => UNCATEGORIZED,
            category => category,
        };
        parsed.rows.push(CsvRow {
            question: question.to_string(),
            answer: answer.to_string(),
            category: category.to_string(),
            review_count: field(4).parse().unwrap_or(0),
        });
    }
    parsed
}

/// Imports CSV rows as new cards due at `now`
#[instrument(skip(deck, text))]
pub async fn restore_csv<S: LocalStore>(deck: &Deck<S>, text: &str, now: DateTime<Utc>) -> Result<RestoreReport, AppError> {
    let parsed = parse_csv(text);
    let cards: Vec<Card> = parsed
        .rows
        .into_iter()
        .map(|row| {
            let mut card = Card::new(row.question, row.answer, Some(row.category), now);
            card.set_review_count(row.review_count);
            card
        })
        .collect();

    let report = RestoreReport { restored: cards.len(), skipped: parsed.skipped, settings: 0 };
    deck.upsert_cards(cards).await?;
    info!("Imported {} cards from CSV, skipped {}", report.restored, report.skipped);
    Ok(report)
}

/// Writes a full backup into `dir` as `flashsync-backup-<millis>.json`
pub async fn write_backup_file<S: LocalStore>(deck: &Deck<S>, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf, AppError> {
    let document = export_backup(deck, now).await?;
    let json = serde_json::to_string_pretty(&document)?;

    tokio::fs::create_dir_all(dir).await.map_err(AppError::storage)?;
    let path = dir.join(format!("{}{}.json", BACKUP_FILE_PREFIX, document.timestamp));
    tokio::fs::write(&path, json).await.map_err(AppError::storage)?;

    debug!("Wrote backup {:?}", path);
    Ok(path)
}

fn backup_timestamp(path: &Path) -> Option<i64> {
    path.file_name()?
        .to_str()?
        .strip_prefix(BACKUP_FILE_PREFIX)?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

/// Lists the automatic backups in `dir`, newest first
pub async fn list_backups(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    if !tokio::fs::try_exists(dir).await.map_err(AppError::storage)? {
        return Ok(Vec::new());
    }

    let mut entries = tokio::fs::read_dir(dir).await.map_err(AppError::storage)?;
    let mut backups: Vec<(i64, PathBuf)> = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(AppError::storage)? {
        let path = entry.path();
        if let Some(ts) = backup_timestamp(&path) {
            backups.push((ts, path));
        }
    }
    backups.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(backups.into_iter().map(|(_, path)| path).collect())
}

/// Deletes all but the newest `keep` automatic backups
///
/// ### Returns
///
/// The deleted files
pub async fn rotate_backups(dir: &Path, keep: usize) -> Result<Vec<PathBuf>, AppError> {
    let stale: Vec<PathBuf> = list_backups(dir).await?.into_iter().skip(keep).collect();
    for path in &stale {
        tokio::fs::remove_file(path).await.map_err(AppError::storage)?;
    }
    if !stale.is_empty() {
        debug!("Removed {} old backups", stale.len());
    }
    Ok(stale)
}

/// Writes a backup and rotates old ones every `interval`
///
/// Failures are logged and the next run tries again.
pub fn schedule_auto_backup<S: LocalStore>(
    deck: Arc<Deck<S>>,
    dir: PathBuf,
    interval: Duration,
    keep: usize,
) -> ScheduledTask {
    ScheduledTask::every("auto-backup", interval, move || {
        let deck = Arc::clone(&deck);
        let dir = dir.clone();
        async move {
            let result = async {
                let path = write_backup_file(&deck, &dir, Utc::now()).await?;
                rotate_backups(&dir, keep).await?;
                Ok::<_, AppError>(path)
            }
            .await;
            match result {
                Ok(path) => info!("Automatic backup written to {:?}", path),
                Err(err) => warn!("Automatic backup failed: {}", err),
            }
        }
    })
}

#[cfg(test)]
mod tests;
