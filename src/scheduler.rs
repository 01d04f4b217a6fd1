//! Fixed-interval spaced repetition scheduling
//!
//! Every function here is pure: it computes values from its inputs and the
//! clock reading it is handed, and never touches storage.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::errors::AppError;
use crate::models::{Card, Difficulty};

/// Days until the next review for each outcome
pub const INTERVAL_TABLE: [(Difficulty, i64); 4] = [
    (Difficulty::Forgot, 1),
    (Difficulty::Unsure, 3),
    (Difficulty::Remembered, 7),
    (Difficulty::Perfect, 14),
];

/// Category used for cards without one when grouping
pub const UNCATEGORIZED: &str = "その他";

/// Looks up the review interval for an outcome
pub fn interval_days(outcome: Difficulty) -> i64 {
    INTERVAL_TABLE
        .iter()
        .find(|(d, _)| *d == outcome)
        .map(|(_, days)| *days)
        .unwrap_or(1)
}

/// Returns whether a card should be studied on `today`'s (UTC) date
///
/// Only calendar dates are compared; a card scheduled for late tonight is
/// already due this morning. Cards without a next review date are always due.
pub fn is_due(card: &Card, today: DateTime<Utc>) -> bool {
    match card.get_next_review() {
        Some(next) => next.date_naive() <= today.date_naive(),
        None => true,
    }
}

/// Filters the due cards, keeping the input order
pub fn due_cards<'a, I>(cards: I, today: DateTime<Utc>) -> Vec<Card>
where
    I: IntoIterator<Item = &'a Card>,
{
    cards
        .into_iter()
        .filter(|card| is_due(card, today))
        .cloned()
        .collect()
}

/// Computes the card that results from reviewing `card` with `outcome` at `now`
///
/// ### Returns
///
/// A new card with the review recorded and the next review pushed out by the
/// outcome's interval; the input card is left untouched
pub fn apply_outcome(card: &Card, outcome: Difficulty, now: DateTime<Utc>) -> Card {
    let mut reviewed = card.clone();
    reviewed.set_last_review(Some(now));
    reviewed.set_next_review(Some(now + Duration::days(interval_days(outcome))));
    reviewed.set_review_count(card.get_review_count().saturating_add(1));
    reviewed.set_difficulty(Some(outcome));
    reviewed.set_last_modified(now);
    reviewed
}

/// Like [`apply_outcome`], taking the outcome as its wire label
///
/// ### Errors
///
/// Returns `AppError::InvalidOutcome` for a label outside the known set
pub fn apply_outcome_label(card: &Card, outcome: &str, now: DateTime<Utc>) -> Result<Card, AppError> {
    let outcome = outcome.parse::<Difficulty>()?;
    Ok(apply_outcome(card, outcome, now))
}

/// Groups scheduled cards by review date, soonest first
///
/// ### Arguments
///
/// * `cards` - The cards to group; cards without a next review are skipped
/// * `limit` - How many distinct dates to return
///
/// ### Returns
///
/// Up to `limit` (date, card count) pairs in ascending date order
pub fn review_schedule(cards: &[Card], limit: usize) -> Vec<(NaiveDate, usize)> {
    let mut by_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for next in cards.iter().filter_map(Card::get_next_review) {
        *by_day.entry(next.date_naive()).or_default() += 1;
    }
    by_day.into_iter().take(limit).collect()
}

/// Counts cards per category, sorted by category name
pub fn category_counts(cards: &[Card]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for card in cards {
        let category = card.get_category().unwrap_or(UNCATEGORIZED);
        *counts.entry(category.to_string()).or_default() += 1;
    }
    counts.into_iter().collect()
}

/// Filters cards by a search term and a category, keeping the input order
///
/// The term matches a case-insensitive substring of the question or the
/// answer; a blank term matches every card. A card without a category belongs
/// to [`UNCATEGORIZED`].
pub fn filter_cards<'a, I>(cards: I, search: Option<&str>, category: Option<&str>) -> Vec<Card>
where
    I: IntoIterator<Item = &'a Card>,
{
    let term = search.map(str::trim).filter(|t| !t.is_empty()).map(str::to_lowercase);

    cards
        .into_iter()
        .filter(|card| {
            term.as_deref().is_none_or(|term| {
                card.get_question().to_lowercase().contains(term)
                    || card.get_answer().to_lowercase().contains(term)
            })
        })
        .filter(|card| {
            category.is_none_or(|wanted| card.get_category().unwrap_or(UNCATEGORIZED) == wanted)
        })
        .cloned()
        .collect()
}


#[cfg(test)]
mod prop_tests;
