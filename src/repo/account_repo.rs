use crate::db::DbPool;
use crate::models::{AccountRecord, Identity};
use crate::schema::accounts;
use chrono::Utc;
use diesel::prelude::*;
use anyhow::Result;
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::{instrument, debug, info};

fn hash_password(salt: &str, password: &str) -> String {
    let digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    hex::encode(digest)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Creates an account with a freshly salted password hash
///
/// ### Returns
///
/// The new account's identity, or None if the email address is taken
#[instrument(skip(pool, password))]
pub fn create_account(pool: &DbPool, email: &str, password: &str) -> Result<Option<Identity>> {
    let conn = &mut pool.get()?;
    let email = normalize_email(email);

    let salt = hex::encode(rand::rng().random::<[u8; 16]>());
    let record = AccountRecord {
        user_id: uuid::Uuid::new_v4().to_string(),
        email: email.clone(),
        password_hash: hash_password(&salt, password),
        salt,
        created_at: Utc::now().naive_utc(),
    };

    let created = conn.transaction::<_, anyhow::Error, _>(|conn| {
        let taken = accounts::table
            .filter(accounts::email.eq(&email))
            .count()
            .get_result::<i64>(conn)?
            > 0;
        if taken {
            return Ok(false);
        }
        diesel::insert_into(accounts::table)
            .values(&record)
            .execute(conn)?;
        Ok(true)
    })?;

    if !created {
        debug!("Email already registered");
        return Ok(None);
    }
    info!("Created account {}", record.user_id);
    Ok(Some(record.identity()))
}


/// Checks an email address and password against the stored hash
///
/// ### Returns
///
/// The account's identity, or None for an unknown address or wrong password
#[instrument(skip(pool, password))]
pub fn verify_account(pool: &DbPool, email: &str, password: &str) -> Result<Option<Identity>> {
    let conn = &mut pool.get()?;

    let record = accounts::table
        .filter(accounts::email.eq(normalize_email(email)))
        .select(AccountRecord::as_select())
        .first::<AccountRecord>(conn)
        .optional()?;

    Ok(record
        .filter(|account| hash_password(&account.salt, password) == account.password_hash)
        .map(|account| account.identity()))
}
