//! Game session records and the in-memory session store.

use crate::error::StoreError;
use derive_setters::Setters;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Free-form level 2 scratch data kept alongside a session.
pub type SolutionNotes = serde_json::Map<String, serde_json::Value>;

/// Number of outliers hidden in a fresh level 3 plot.
pub const INITIAL_OUTLIERS: u32 = 5;

/// Length of client-generated session ids.
pub const SESSION_ID_LEN: usize = 9;

const SESSION_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Progress record for one play-through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    /// Session ID.
    pub id: SessionId,
    /// Level currently presented (1-3).
    pub current_level: u8,
    /// Sequence quiz finished.
    pub level1_completed: bool,
    /// Logic grid solved.
    pub level2_completed: bool,
    /// All outliers removed.
    pub level3_completed: bool,
    /// Every level finished.
    pub game_completed: bool,
    /// Outliers still on the level 3 plot.
    #[serde(default = "default_outliers")]
    pub outliers_remaining: u32,
    /// Optional level 2 scratch data, never read by validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level2_solution: Option<SolutionNotes>,
}

fn default_outliers() -> u32 {
    INITIAL_OUTLIERS
}

impl GameSession {
    /// Creates a session at level 1 with nothing completed.
    #[instrument]
    pub fn new(id: SessionId) -> Self {
        debug!(session_id = %id, "Creating default game session");
        Self {
            id,
            current_level: 1,
            level1_completed: false,
            level2_completed: false,
            level3_completed: false,
            game_completed: false,
            outliers_remaining: INITIAL_OUTLIERS,
            level2_solution: None,
        }
    }
}

/// Partial update merged shallowly over an existing session.
///
/// Absent fields leave the session untouched. `level2_solution` distinguishes
/// an absent key (`None`) from an explicit JSON `null` (`Some(None)`), which
/// clears the stored notes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Setters)]
#[serde(rename_all = "camelCase")]
#[setters(strip_option)]
pub struct SessionPatch {
    /// New current level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_level: Option<u8>,
    /// New level 1 flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level1_completed: Option<bool>,
    /// New level 2 flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level2_completed: Option<bool>,
    /// New level 3 flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level3_completed: Option<bool>,
    /// New game flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_completed: Option<bool>,
    /// New outlier count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outliers_remaining: Option<u32>,
    /// Replacement (or `Some(None)` to clear) level 2 notes.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub level2_solution: Option<Option<SolutionNotes>>,
}

// Wraps any present value, including `null`, so absence stays `None`.
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl SessionPatch {
    /// Checks field ranges.
    ///
    /// # Errors
    ///
    /// Returns a validation [`StoreError`] when `current_level` is outside 1-3.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), StoreError> {
        match self.current_level {
            Some(level) if !(1..=3).contains(&level) => {
                warn!(level, "Rejected patch with out-of-range level");
                Err(StoreError::validation(format!(
                    "currentLevel must be between 1 and 3, got {}",
                    level
                )))
            }
            _ => Ok(()),
        }
    }

    /// Returns true when the patch sets nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges the patch over `session` in place.
    pub fn apply_to(&self, session: &mut GameSession) {
        if let Some(level) = self.current_level {
            session.current_level = level;
        }
        if let Some(done) = self.level1_completed {
            session.level1_completed = done;
        }
        if let Some(done) = self.level2_completed {
            session.level2_completed = done;
        }
        if let Some(done) = self.level3_completed {
            session.level3_completed = done;
        }
        if let Some(done) = self.game_completed {
            session.game_completed = done;
        }
        if let Some(remaining) = self.outliers_remaining {
            session.outliers_remaining = remaining;
        }
        if let Some(notes) = &self.level2_solution {
            session.level2_solution = notes.clone();
        }
    }

    /// Validates the patch and returns `existing` with the patch merged in.
    ///
    /// # Errors
    ///
    /// Returns a validation [`StoreError`] if [`SessionPatch::validate`] fails.
    pub fn merged(&self, existing: &GameSession) -> Result<GameSession, StoreError> {
        self.validate()?;
        let mut updated = existing.clone();
        self.apply_to(&mut updated);
        Ok(updated)
    }
}

/// Keyed storage for game sessions.
///
/// Implementations run each operation synchronously; callers own one session
/// each, so no cross-operation locking is required.
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Looks up a session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage fails.
    fn get(&self, id: &str) -> Result<Option<GameSession>, StoreError>;

    /// Stores a default session under `id`, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage fails.
    fn create(&self, id: &str) -> Result<GameSession, StoreError>;

    /// Merges `patch` into the stored session and persists the result.
    ///
    /// # Errors
    ///
    /// Returns a not-found [`StoreError`] if no session exists for `id`, or a
    /// validation error if the patch is out of range.
    fn update(&self, id: &str, patch: &SessionPatch) -> Result<GameSession, StoreError>;

    /// Returns the stored session, creating it on first access.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage fails.
    fn get_or_create(&self, id: &str) -> Result<GameSession, StoreError> {
        match self.get(id)? {
            Some(session) => Ok(session),
            None => self.create(id),
        }
    }
}

/// Session store held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sessions: Arc<Mutex<HashMap<SessionId, GameSession>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory session store");
        Self::default()
    }

    /// Number of sessions held.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the session map lock is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    /// Returns true when no session has been created.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the session map lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<SessionId, GameSession>>, StoreError> {
        self.sessions
            .lock()
            .map_err(|_| StoreError::storage("session map lock poisoned"))
    }
}

impl SessionStore for MemoryStore {
    #[instrument(skip(self))]
    fn get(&self, id: &str) -> Result<Option<GameSession>, StoreError> {
        let session = self.lock()?.get(id).cloned();
        if session.is_none() {
            debug!(session_id = id, "Session not found");
        }
        Ok(session)
    }

    #[instrument(skip(self))]
    fn create(&self, id: &str) -> Result<GameSession, StoreError> {
        let session = GameSession::new(id.to_string());
        let replaced = self
            .lock()?
            .insert(id.to_string(), session.clone())
            .is_some();
        info!(session_id = id, replaced, "Created game session");
        Ok(session)
    }

    #[instrument(skip(self, patch))]
    fn update(&self, id: &str, patch: &SessionPatch) -> Result<GameSession, StoreError> {
        let mut sessions = self.lock()?;
        let existing = sessions.get(id).ok_or_else(|| {
            warn!(session_id = id, "Update for unknown session");
            StoreError::not_found(id)
        })?;

        let updated = patch.merged(existing)?;
        sessions.insert(id.to_string(), updated.clone());
        debug!(session_id = id, ?patch, "Session updated");
        Ok(updated)
    }
}

/// Generates a 9-character lowercase base-36 session id.
pub fn generate_session_id<R: Rng + ?Sized>(rng: &mut R) -> SessionId {
    (0..SESSION_ID_LEN)
        .map(|_| char::from(SESSION_ID_ALPHABET[rng.random_range(0..SESSION_ID_ALPHABET.len())]))
        .collect()
}
