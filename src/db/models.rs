//! Key/value rows.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;

use crate::db::schema;

/// A stored key/value entry.
#[derive(Debug, Clone, Queryable, Selectable, Getters)]
#[diesel(table_name = schema::local_storage)]
pub struct StoredEntry {
    key: String,
    value: String,
    updated_at: NaiveDateTime,
}

/// Row written on every save; replaces any entry with the same key.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::local_storage)]
pub struct NewStoredEntry {
    key: String,
    value: String,
    updated_at: NaiveDateTime,
}
