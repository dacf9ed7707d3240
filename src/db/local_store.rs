//! Session store persisted on the player's machine.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use crate::db::{NewStoredEntry, StoredEntry, schema};
use crate::error::StoreError;
use crate::session::{GameSession, SessionPatch, SessionStore};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Key under which a session document is stored.
pub fn storage_key(session_id: &str) -> String {
    format!("game-session-{}", session_id)
}

/// Session store writing each session as a JSON document under
/// `game-session-{id}` in a local SQLite key/value table.
#[derive(Debug, Clone)]
pub struct LocalStore {
    db_path: String,
}

impl LocalStore {
    /// Opens (creating if needed) the store at `db_path` and applies migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, StoreError> {
        info!(path = %db_path, "Opening local session store");
        let store = Self { db_path };
        let mut conn = store.connection()?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::storage(format!("Migrations failed: {}", e)))?;
        Ok(store)
    }

    /// Path of the backing database file.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StoreError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path).map_err(|e| {
            StoreError::storage(format!("Failed to connect to '{}': {}", self.db_path, e))
        })
    }

    /// Reads the raw document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn read_entry(&self, key: &str) -> Result<Option<StoredEntry>, StoreError> {
        let mut conn = self.connection()?;
        let entry = schema::local_storage::table
            .find(key)
            .select(StoredEntry::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(entry)
    }

    /// Writes a raw document under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a database error occurs.
    #[instrument(skip(self, value))]
    pub fn write_entry(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        let entry = NewStoredEntry::new(key.to_string(), value, chrono::Utc::now().naive_utc());
        diesel::replace_into(schema::local_storage::table)
            .values(&entry)
            .execute(&mut conn)?;
        debug!(key, "Entry written");
        Ok(())
    }

    fn save(&self, session: &GameSession) -> Result<(), StoreError> {
        let document = serde_json::to_string(session)?;
        self.write_entry(&storage_key(&session.id), document)
    }
}

impl SessionStore for LocalStore {
    /// Unreadable documents read as absent.
    #[instrument(skip(self))]
    fn get(&self, id: &str) -> Result<Option<GameSession>, StoreError> {
        let Some(entry) = self.read_entry(&storage_key(id))? else {
            debug!(session_id = id, "Session not found");
            return Ok(None);
        };

        match serde_json::from_str::<GameSession>(entry.value()) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(session_id = id, error = %e, "Stored session unreadable, treating as absent");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self))]
    fn create(&self, id: &str) -> Result<GameSession, StoreError> {
        let session = GameSession::new(id.to_string());
        self.save(&session)?;
        info!(session_id = id, "Created game session");
        Ok(session)
    }

    #[instrument(skip(self, patch))]
    fn update(&self, id: &str, patch: &SessionPatch) -> Result<GameSession, StoreError> {
        let existing = self.get(id)?.ok_or_else(|| {
            warn!(session_id = id, "Update for unknown session");
            StoreError::not_found(id)
        })?;

        let updated = patch.merged(&existing)?;
        self.save(&updated)?;
        debug!(session_id = id, ?patch, "Session updated");
        Ok(updated)
    }
}
