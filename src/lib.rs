//! Pattern & Logic Challenge - a three-level puzzle game
//!
//! Players work through a number-sequence quiz, a logic-grid puzzle and an
//! outlier-removal scatter plot. Progress lives in a per-player
//! [`GameSession`] kept by a [`SessionStore`].
//!
//! # Architecture
//!
//! - **Levels**: question bank, validators and transient per-level state
//! - **Session**: the session record, partial updates and the in-memory store
//! - **Db**: client-local store persisted in SQLite
//! - **Server**: REST endpoints over any store
//! - **Backend**: in-process or HTTP access used by the orchestrator
//! - **Orchestrator**: level sequencing and completion transitions
//!
//! # Example
//!
//! ```no_run
//! use pattern_challenge::{GameOrchestrator, MemoryStore, StoreBackend};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let backend = StoreBackend::new(MemoryStore::new());
//! let mut game = GameOrchestrator::start(backend, "k3j9x0a2b").await?;
//! game.answer(15).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod backend;
mod config;
mod db;
mod error;
mod levels;
mod orchestrator;
mod server;
mod session;
pub mod terminal;

// Crate-level exports - Session management
pub use session::{
    GameSession, INITIAL_OUTLIERS, MemoryStore, SESSION_ID_LEN, SessionId, SessionPatch,
    SessionStore, SolutionNotes, generate_session_id,
};

// Crate-level exports - Errors
pub use error::{StoreError, StoreErrorKind};

// Crate-level exports - Local persistence
pub use db::{LocalStore, NewStoredEntry, StoredEntry, storage_key};

// Crate-level exports - Levels
pub use levels::{
    AnswerOutcome, CLUES, CLUSTER_POINTS, DataPoint, Difficulty, DraftCell, GridSolution,
    Level2Verdict, LogicGrid, OutlierPlot, Question, QuestionSet, QuestionStatus, RemovalOutcome,
    STORY, SequenceQuiz, Shape, ShapeAssignment, ShapeColor, answer_options, catalog,
    check_answer, correct_solution, pick_one_question_per_difficulty, questions_for,
    synthesize_distractors, validate_level2, validate_level2_submission, Level2Submission,
};

// Crate-level exports - Orchestration
pub use orchestrator::{
    GameOrchestrator, GameStage, GridOutcome, LevelView, PlayError, completion_patch,
    reset_patch, retry_patch,
};

// Crate-level exports - Backends
pub use backend::{BackendError, BackendErrorKind, GameBackend, HttpBackend, StoreBackend};

// Crate-level exports - Server and configuration
pub use config::{
    AppConfig, ConfigError, DEFAULT_CONFIG_FILE, ServerSettings, StoreBackendKind, StoreSettings,
};
pub use server::{ApiError, AppState, create_router};
