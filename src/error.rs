//! Session store error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// What went wrong inside a session store.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum StoreErrorKind {
    /// No session exists for the given id.
    #[display("Game session not found: {}", _0)]
    NotFound(String),
    /// A partial update carried out-of-range values.
    #[display("Invalid game session data: {}", _0)]
    Validation(String),
    /// The backing storage failed (lock, database, encoding).
    #[display("Storage failure: {}", _0)]
    Storage(String),
}

/// Session store error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("{} at {}:{}", kind, file, line)]
pub struct StoreError {
    /// Error category.
    pub kind: StoreErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: StoreErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Update targeted a session that does not exist.
    #[track_caller]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::NotFound(id.into()))
    }

    /// Partial update failed validation.
    #[track_caller]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Validation(message.into()))
    }

    /// Backing storage failure.
    #[track_caller]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Storage(message.into()))
    }

    /// Returns true when the error reports a missing session.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, StoreErrorKind::NotFound(_))
    }
}

impl From<diesel::result::Error> for StoreError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::storage(format!("Diesel error: {}", err))
    }
}

impl From<diesel::ConnectionError> for StoreError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::storage(format!("Connection error: {}", err))
    }
}

impl From<serde_json::Error> for StoreError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::storage(format!("Encoding error: {}", err))
    }
}
