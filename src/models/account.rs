use chrono::NaiveDateTime;
use diesel::prelude::*;

use super::Identity;

/// A server-side account row
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountRecord {
    pub user_id: String,
    pub email: String,
    /// Hex SHA-256 of the salt followed by the password
    pub password_hash: String,
    pub salt: String,
    pub created_at: NaiveDateTime,
}

impl AccountRecord {
    pub fn identity(&self) -> Identity {
        Identity::new(self.user_id.clone(), self.email.clone())
    }
}

/// A stored user document; `body` is the document's JSON text
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::documents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DocumentRecord {
    pub user_id: String,
    pub body: String,
    pub updated_at: NaiveDateTime,
}
