use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::Difficulty;
use crate::errors::AppError;

/// Review outcome counters for one calendar day (UTC)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStatistic {
    pub date: NaiveDate,
    #[serde(default)]
    pub forgot: u32,
    #[serde(default)]
    pub unsure: u32,
    #[serde(default)]
    pub remembered: u32,
    #[serde(default)]
    pub perfect: u32,
}

impl DailyStatistic {
    pub fn empty(date: NaiveDate) -> Self {
        Self { date, forgot: 0, unsure: 0, remembered: 0, perfect: 0 }
    }

    /// Number of reviews that ended with `outcome`
    pub fn count(&self, outcome: Difficulty) -> u32 {
        match outcome {
            Difficulty::Forgot => self.forgot,
            Difficulty::Unsure => self.unsure,
            Difficulty::Remembered => self.remembered,
            Difficulty::Perfect => self.perfect,
        }
    }

    pub fn increment(&mut self, outcome: Difficulty) {
        let slot = match outcome {
            Difficulty::Forgot => &mut self.forgot,
            Difficulty::Unsure => &mut self.unsure,
            Difficulty::Remembered => &mut self.remembered,
            Difficulty::Perfect => &mut self.perfect,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn total(&self) -> u32 {
        Difficulty::ALL.iter().map(|d| self.count(*d)).sum()
    }
}

/// Database row for a day's statistics
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::statistics)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StatisticRecord {
    pub day: String,
    pub forgot: i32,
    pub unsure: i32,
    pub remembered: i32,
    pub perfect: i32,
}

fn to_column(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

fn from_column(count: i32) -> u32 {
    u32::try_from(count).unwrap_or(0)
}

impl From<&DailyStatistic> for StatisticRecord {
    fn from(stat: &DailyStatistic) -> Self {
        Self {
            day: stat.date.format("%Y-%m-%d").to_string(),
            forgot: to_column(stat.forgot),
            unsure: to_column(stat.unsure),
            remembered: to_column(stat.remembered),
            perfect: to_column(stat.perfect),
        }
    }
}

impl TryFrom<StatisticRecord> for DailyStatistic {
    type Error = AppError;

    fn try_from(record: StatisticRecord) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(&record.day, "%Y-%m-%d")
            .map_err(|e| AppError::Storage(format!("corrupt statistics day {}: {}", record.day, e)))?;
        Ok(Self {
            date,
            forgot: from_column(record.forgot),
            unsure: from_column(record.unsure),
            remembered: from_column(record.remembered),
            perfect: from_column(record.perfect),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_and_total() {
        let mut stat = DailyStatistic::empty(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        stat.increment(Difficulty::Perfect);
        stat.increment(Difficulty::Perfect);
        stat.increment(Difficulty::Forgot);

        assert_eq!(stat.count(Difficulty::Perfect), 2);
        assert_eq!(stat.count(Difficulty::Forgot), 1);
        assert_eq!(stat.count(Difficulty::Unsure), 0);
        assert_eq!(stat.total(), 3);
    }

    #[test]
    fn test_record_uses_iso_day() {
        let stat = DailyStatistic::empty(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        let record = StatisticRecord::from(&stat);
        assert_eq!(record.day, "2025-01-02");
        assert_eq!(DailyStatistic::try_from(record).unwrap(), stat);
    }
}
