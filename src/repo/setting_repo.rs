use crate::db::DbPool;
use crate::models::{Setting, SettingRecord};
use crate::schema::settings;
use diesel::prelude::*;
use anyhow::Result;
use tracing::{instrument, debug};

/// Retrieves a setting by key
///
/// ### Returns
///
/// A Result containing the setting if stored, or None
#[instrument(skip(pool))]
pub fn get_setting(pool: &DbPool, key: &str) -> Result<Option<Setting>> {
    let conn = &mut pool.get()?;

    let record = settings::table
        .find(key)
        .select(SettingRecord::as_select())
        .first::<SettingRecord>(conn)
        .optional()?;

    Ok(record.map(Setting::try_from).transpose()?)
}


/// Stores a setting, replacing any previous value for the key
#[instrument(skip(pool, setting), fields(key = %setting.key))]
pub fn put_setting(pool: &DbPool, setting: &Setting) -> Result<()> {
    let conn = &mut pool.get()?;
    let record = SettingRecord::try_from(setting)?;

    diesel::replace_into(settings::table)
        .values(&record)
        .execute(conn)?;

    debug!("Stored setting");
    Ok(())
}


/// Lists every stored setting ordered by key
#[instrument(skip(pool))]
pub fn list_settings(pool: &DbPool) -> Result<Vec<Setting>> {
    let conn = &mut pool.get()?;

    let records = settings::table
        .order(settings::name.asc())
        .select(SettingRecord::as_select())
        .load::<SettingRecord>(conn)?;

    let settings = records
        .into_iter()
        .map(Setting::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(settings)
}
