use crate::db::DbPool;
use crate::models::{DocumentRecord, RemoteDocument};
use crate::schema::documents;
use chrono::Utc;
use diesel::prelude::*;
use anyhow::Result;
use tracing::{instrument, debug};

fn load_document(conn: &mut SqliteConnection, user_id: &str) -> Result<Option<RemoteDocument>> {
    let record = documents::table
        .find(user_id)
        .select(DocumentRecord::as_select())
        .first::<DocumentRecord>(conn)
        .optional()?;

    match record {
        Some(record) => Ok(Some(serde_json::from_str(&record.body)?)),
        None => Ok(None),
    }
}

fn store_document(conn: &mut SqliteConnection, user_id: &str, document: &RemoteDocument) -> Result<()> {
    let record = DocumentRecord {
        user_id: user_id.to_string(),
        body: serde_json::to_string(document)?,
        updated_at: Utc::now().naive_utc(),
    };
    diesel::replace_into(documents::table)
        .values(&record)
        .execute(conn)?;
    Ok(())
}

/// Retrieves a user's document
#[instrument(skip(pool))]
pub fn get_document(pool: &DbPool, user_id: &str) -> Result<Option<RemoteDocument>> {
    let conn = &mut pool.get()?;
    load_document(conn, user_id)
}


/// Replaces a user's document as a whole
#[instrument(skip(pool, document))]
pub fn replace_document(pool: &DbPool, user_id: &str, document: &RemoteDocument) -> Result<()> {
    let conn = &mut pool.get()?;
    store_document(conn, user_id, document)?;
    debug!("Replaced document");
    Ok(())
}


/// Merges `update` into a user's document, creating it if absent
///
/// ### Returns
///
/// The document as stored after the merge
#[instrument(skip(pool, update))]
pub fn merge_document(pool: &DbPool, user_id: &str, update: RemoteDocument) -> Result<RemoteDocument> {
    let conn = &mut pool.get()?;

    let merged = conn.transaction::<_, anyhow::Error, _>(|conn| {
        let mut document = load_document(conn, user_id)?.unwrap_or_default();
        document.merge_from(update);
        store_document(conn, user_id, &document)?;
        Ok(document)
    })?;

    debug!("Merged document now holds {} cards", merged.cards().len());
    Ok(merged)
}
