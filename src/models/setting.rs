use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// A single persisted preference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: serde_json::Value,
}

impl Setting {
    pub fn new(key: impl Into<String>, value: serde_json::Value) -> Self {
        Self { key: key.into(), value }
    }
}

/// Database row for a setting; the value is stored as JSON text
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SettingRecord {
    pub name: String,
    pub value: String,
}

impl TryFrom<&Setting> for SettingRecord {
    type Error = AppError;

    fn try_from(setting: &Setting) -> Result<Self, Self::Error> {
        Ok(Self {
            name: setting.key.clone(),
            value: serde_json::to_string(&setting.value)?,
        })
    }
}

impl TryFrom<SettingRecord> for Setting {
    type Error = AppError;

    fn try_from(record: SettingRecord) -> Result<Self, Self::Error> {
        let value = serde_json::from_str(&record.value)
            .map_err(|e| AppError::Storage(format!("corrupt setting {}: {}", record.name, e)))?;
        Ok(Self { key: record.name, value })
    }
}
