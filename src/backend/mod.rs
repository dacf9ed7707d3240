//! Where the orchestrator sends session reads, writes and level 2 checks.
//!
//! [`StoreBackend`] calls a [`SessionStore`](crate::SessionStore) in process;
//! [`HttpBackend`] talks to a running game server.

mod http;
mod local;

pub use http::HttpBackend;
pub use local::StoreBackend;

use crate::error::{StoreError, StoreErrorKind};
use crate::levels::{GridSolution, Level2Verdict};
use crate::session::{GameSession, SessionPatch};
use async_trait::async_trait;
use derive_more::{Display, Error};
use tracing::error;

/// What a backend call failed on.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum BackendErrorKind {
    /// The in-process store failed.
    #[display("{}", _0)]
    Store(StoreErrorKind),
    /// The request never produced a response.
    #[display("Request failed: {}", _0)]
    Transport(String),
    /// The server answered with an error status.
    #[display("Server returned {}: {}", status, message)]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from the response body.
        message: String,
    },
}

/// Backend error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("{} at {}:{}", kind, file, line)]
pub struct BackendError {
    /// Error category.
    pub kind: BackendErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl BackendError {
    /// Creates a new backend error.
    #[track_caller]
    pub fn new(kind: BackendErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        error!(error = %kind, "Backend error created");
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        Self {
            kind: BackendErrorKind::Store(err.kind),
            line: err.line,
            file: err.file,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::new(BackendErrorKind::Transport(err.to_string()))
    }
}

/// Session operations available to the game orchestrator.
#[async_trait]
pub trait GameBackend: Send + Sync {
    /// Returns the session, creating it on first access.
    async fn load_session(&self, id: &str) -> Result<GameSession, BackendError>;

    /// Merges a partial update into the session.
    async fn update_session(&self, id: &str, patch: &SessionPatch) -> Result<GameSession, BackendError>;

    /// Checks a level 2 assignment.
    async fn validate_level2(
        &self,
        id: &str,
        solution: &GridSolution,
    ) -> Result<Level2Verdict, BackendError>;
}
