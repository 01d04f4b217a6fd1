use crate::db::DbPool;
use crate::models::{Card, CardRecord};
use crate::schema::cards;
use diesel::prelude::*;
use anyhow::Result;
use tracing::{instrument, debug, info};

/// Lists every card row, oldest first
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
///
/// ### Returns
///
/// A Result containing all card rows ordered by creation time, then id
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool))]
pub fn list_card_records(pool: &DbPool) -> Result<Vec<CardRecord>> {
    let conn = &mut pool.get()?;

    let records = cards::table
        .order((cards::created_at.asc(), cards::id.asc()))
        .select(CardRecord::as_select())
        .load::<CardRecord>(conn)?;

    debug!("Loaded {} cards", records.len());
    Ok(records)
}


/// Retrieves a single card row by id
#[instrument(skip(pool))]
pub fn get_card_record(pool: &DbPool, card_id: &str) -> Result<Option<CardRecord>> {
    let conn = &mut pool.get()?;

    let record = cards::table
        .find(card_id)
        .select(CardRecord::as_select())
        .first::<CardRecord>(conn)
        .optional()?;

    Ok(record)
}


/// Inserts a card or replaces the stored card with the same id
///
/// The row is replaced as a whole in a single statement, so readers never see
/// a partially written card.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `card` - The card to store
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database write fails
#[instrument(skip(pool, card), fields(card_id = %card.get_id()))]
pub fn upsert_card(pool: &DbPool, card: &Card) -> Result<()> {
    let conn = &mut pool.get()?;

    diesel::replace_into(cards::table)
        .values(CardRecord::from(card))
        .execute(conn)?;

    debug!("Stored card");
    Ok(())
}


/// Inserts or replaces a batch of cards in one transaction
///
/// Either every card in the batch is stored or none is.
#[instrument(skip(pool, batch), fields(count = batch.len()))]
pub fn upsert_cards(pool: &DbPool, batch: &[Card]) -> Result<()> {
    let conn = &mut pool.get()?;
    let records: Vec<CardRecord> = batch.iter().map(CardRecord::from).collect();

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        for record in &records {
            diesel::replace_into(cards::table)
                .values(record)
                .execute(conn)?;
        }
        Ok(())
    })?;

    info!("Stored {} cards", records.len());
    Ok(())
}


/// Deletes a card by id
///
/// ### Returns
///
/// A Result containing true if a card was removed, false if none existed
#[instrument(skip(pool))]
pub fn delete_card(pool: &DbPool, card_id: &str) -> Result<bool> {
    let conn = &mut pool.get()?;

    let removed = diesel::delete(cards::table.find(card_id)).execute(conn)?;

    if removed == 0 {
        debug!("No card to delete");
    } else {
        info!("Deleted card");
    }
    Ok(removed > 0)
}


/// Deletes every card
///
/// ### Returns
///
/// A Result containing the number of removed cards
#[instrument(skip(pool))]
pub fn clear_cards(pool: &DbPool) -> Result<usize> {
    let conn = &mut pool.get()?;

    let removed = diesel::delete(cards::table).execute(conn)?;

    info!("Cleared {} cards", removed);
    Ok(removed)
}


#[cfg(test)]
mod tests;
