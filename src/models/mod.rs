/// Data models module
///
/// This module defines the core data structures used throughout the application:
/// the domain types exchanged with the remote replica and backup files, and the
/// database records they are persisted as.

// Re-export all model types
mod difficulty;
pub use difficulty::Difficulty;

mod card;
pub use card::{Card, CardRecord};

mod setting;
pub use setting::{Setting, SettingRecord};

mod statistic;
pub use statistic::{DailyStatistic, StatisticRecord};

mod identity;
pub use identity::Identity;

mod document;
pub use document::{BACKUP_VERSION, BackupDocument, RemoteDocument};

mod account;
pub use account::{AccountRecord, DocumentRecord};
