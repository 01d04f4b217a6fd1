use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Difficulty;
use crate::errors::AppError;

/// Represents a flashcard
///
/// This is the shape exchanged with the remote replica and written to backup
/// files, so it serializes with the camelCase field names those documents use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Unique identifier for the card (UUID v4 as string for new cards)
    id: String,

    /// Front side of the card
    question: String,

    /// Back side of the card
    answer: String,

    /// Optional free-form category label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,

    /// When the card was created
    created_at: DateTime<Utc>,

    /// When the card was last changed, used to pick a winner during sync
    last_modified: DateTime<Utc>,

    /// When this card was last reviewed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_review: Option<DateTime<Utc>>,

    /// When this card should next be reviewed
    #[serde(default)]
    next_review: Option<DateTime<Utc>>,

    /// How many times this card has been reviewed
    #[serde(default)]
    review_count: u32,

    /// The most recent review outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    difficulty: Option<Difficulty>,
}

/// Normalizes a category label, treating blank input as no category
fn normalize_category(category: Option<String>) -> Option<String> {
    category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

impl Card {
    /// Creates a new card that is due immediately
    ///
    /// ### Arguments
    ///
    /// * `question` - The front side of the card
    /// * `answer` - The back side of the card
    /// * `category` - An optional category label; blank labels are dropped
    /// * `now` - The creation time, also used as the first review time
    ///
    /// ### Returns
    ///
    /// A new `Card` with a fresh identifier and no review history
    pub fn new(question: String, answer: String, category: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            question,
            answer,
            category: normalize_category(category),
            created_at: now,
            last_modified: now,
            last_review: None,
            next_review: Some(now),
            review_count: 0,
            difficulty: None,
        }
    }

    /// Creates a card with a caller-chosen identifier and timestamps
    ///
    /// Review state starts empty and the card is due at `created_at`.
    pub fn new_with_fields(
        id: String,
        question: String,
        answer: String,
        category: Option<String>,
        created_at: DateTime<Utc>,
        last_modified: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            question,
            answer,
            category: normalize_category(category),
            created_at,
            last_modified,
            last_review: None,
            next_review: Some(created_at),
            review_count: 0,
            difficulty: None,
        }
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_question(&self) -> &str {
        &self.question
    }

    pub fn set_question(&mut self, question: String) {
        self.question = question;
    }

    pub fn get_answer(&self) -> &str {
        &self.answer
    }

    pub fn set_answer(&mut self, answer: String) {
        self.answer = answer;
    }

    pub fn get_category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.category = normalize_category(category);
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn get_last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    pub fn set_last_modified(&mut self, last_modified: DateTime<Utc>) {
        self.last_modified = last_modified;
    }

    /// Stamps a mutation at `now` without letting `last_modified` go backwards
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_modified = self.last_modified.max(now);
    }

    pub fn get_last_review(&self) -> Option<DateTime<Utc>> {
        self.last_review
    }

    pub fn set_last_review(&mut self, last_review: Option<DateTime<Utc>>) {
        self.last_review = last_review;
    }

    pub fn get_next_review(&self) -> Option<DateTime<Utc>> {
        self.next_review
    }

    pub fn set_next_review(&mut self, next_review: Option<DateTime<Utc>>) {
        self.next_review = next_review;
    }

    pub fn get_review_count(&self) -> u32 {
        self.review_count
    }

    pub fn set_review_count(&mut self, review_count: u32) {
        self.review_count = review_count;
    }

    pub fn get_difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Option<Difficulty>) {
        self.difficulty = difficulty;
    }
}

/// Database row for a card
///
/// Timestamps are stored as naive UTC values, the same way diesel maps
/// SQLite `TIMESTAMP` columns.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::cards)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CardRecord {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub category: Option<String>,
    pub created_at: NaiveDateTime,
    pub last_modified: NaiveDateTime,
    pub last_review: Option<NaiveDateTime>,
    pub next_review: Option<NaiveDateTime>,
    pub review_count: i32,
    pub difficulty: Option<String>,
}

impl From<&Card> for CardRecord {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id.clone(),
            question: card.question.clone(),
            answer: card.answer.clone(),
            category: card.category.clone(),
            created_at: card.created_at.naive_utc(),
            last_modified: card.last_modified.naive_utc(),
            last_review: card.last_review.map(|dt| dt.naive_utc()),
            next_review: card.next_review.map(|dt| dt.naive_utc()),
            review_count: i32::try_from(card.review_count).unwrap_or(i32::MAX),
            difficulty: card.difficulty.map(|d| d.as_str().to_string()),
        }
    }
}

impl TryFrom<CardRecord> for Card {
    type Error = AppError;

    fn try_from(record: CardRecord) -> Result<Self, Self::Error> {
        let difficulty = record
            .difficulty
            .as_deref()
            .map(str::parse::<Difficulty>)
            .transpose()
            .map_err(|e| AppError::Storage(format!("corrupt card {}: {}", record.id, e)))?;

        Ok(Self {
            id: record.id,
            question: record.question,
            answer: record.answer,
            category: record.category,
            created_at: record.created_at.and_utc(),
            last_modified: record.last_modified.and_utc(),
            last_review: record.last_review.map(|dt| dt.and_utc()),
            next_review: record.next_review.map(|dt| dt.and_utc()),
            review_count: u32::try_from(record.review_count).unwrap_or(0),
            difficulty,
        })
    }
}
