//! Client-local persistence: a key/value table in a SQLite file.

mod local_store;
mod models;
mod schema; // Diesel generated schema - internal use only

pub use local_store::{LocalStore, storage_key};
pub use models::{NewStoredEntry, StoredEntry};
