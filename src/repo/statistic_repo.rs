use crate::db::DbPool;
use crate::models::{DailyStatistic, Difficulty, StatisticRecord};
use crate::schema::statistics;
use chrono::NaiveDate;
use diesel::prelude::*;
use anyhow::Result;
use tracing::{instrument, debug};

/// Adds one review outcome to the counters for `day`
///
/// The read-modify-write runs inside a single transaction.
#[instrument(skip(pool))]
pub fn record_review_outcome(pool: &DbPool, day: NaiveDate, outcome: Difficulty) -> Result<()> {
    let conn = &mut pool.get()?;
    let key = day.format("%Y-%m-%d").to_string();

    let updated = conn.transaction::<_, anyhow::Error, _>(|conn| {
        let existing = statistics::table
            .find(&key)
            .select(StatisticRecord::as_select())
            .first::<StatisticRecord>(conn)
            .optional()?;

        let mut stat = match existing {
            Some(record) => DailyStatistic::try_from(record)?,
            None => DailyStatistic::empty(day),
        };
        stat.increment(outcome);

        diesel::replace_into(statistics::table)
            .values(StatisticRecord::from(&stat))
            .execute(conn)?;
        Ok(stat)
    })?;

    debug!("Day now has {} reviews", updated.total());
    Ok(())
}


/// Lists statistics for every recorded day, oldest first
#[instrument(skip(pool))]
pub fn list_statistics(pool: &DbPool) -> Result<Vec<DailyStatistic>> {
    let conn = &mut pool.get()?;

    let records = statistics::table
        .order(statistics::day.asc())
        .select(StatisticRecord::as_select())
        .load::<StatisticRecord>(conn)?;

    let stats = records
        .into_iter()
        .map(DailyStatistic::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(stats)
}
