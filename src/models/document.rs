use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Card, DailyStatistic, Setting};
use crate::reconcile::merge_cards;

/// Schema version tag written into backups and remote documents
pub const BACKUP_VERSION: &str = "1.0.0";

/// A user's document in the remote replica
///
/// Every field is optional so that a merge-write only touches the fields it
/// carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<Card>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Vec<DailyStatistic>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Vec<Setting>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl RemoteDocument {
    /// The cards held by the document, empty when the field is absent
    pub fn cards(&self) -> &[Card] {
        self.cards.as_deref().unwrap_or(&[])
    }

    /// Overlays the fields present in `update` onto this document
    ///
    /// `cards` is combined per id, keeping whichever version was modified
    /// last, so a push never discards a newer edit made on another device.
    pub fn merge_from(&mut self, update: RemoteDocument) {
        if let Some(incoming) = update.cards {
            self.cards = Some(match self.cards.take() {
                Some(stored) => merge_cards(&stored, &incoming),
                None => incoming,
            });
        }
        if update.statistics.is_some() {
            self.statistics = update.statistics;
        }
        if update.settings.is_some() {
            self.settings = update.settings;
        }
        if update.last_modified.is_some() {
            self.last_modified = update.last_modified;
        }
        if update.version.is_some() {
            self.version = update.version;
        }
    }
}

/// The interchange document written by a manual or automatic backup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupDocument {
    pub cards: Vec<Card>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Vec<DailyStatistic>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Vec<Setting>>,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub version: String,
}
