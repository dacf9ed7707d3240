//! In-process backend over any session store.

use crate::backend::{BackendError, GameBackend};
use crate::levels::{GridSolution, Level2Verdict, validate_level2};
use crate::session::{GameSession, SessionPatch, SessionStore};
use async_trait::async_trait;
use tracing::instrument;

/// Calls a [`SessionStore`] directly, with no network layer.
#[derive(Debug, Clone)]
pub struct StoreBackend<S> {
    store: S,
}

impl<S: SessionStore> StoreBackend<S> {
    /// Wraps a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The wrapped store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<S: SessionStore> GameBackend for StoreBackend<S> {
    #[instrument(skip(self))]
    async fn load_session(&self, id: &str) -> Result<GameSession, BackendError> {
        Ok(self.store.get_or_create(id)?)
    }

    #[instrument(skip(self, patch))]
    async fn update_session(&self, id: &str, patch: &SessionPatch) -> Result<GameSession, BackendError> {
        Ok(self.store.update(id, patch)?)
    }

    #[instrument(skip(self, solution))]
    async fn validate_level2(
        &self,
        id: &str,
        solution: &GridSolution,
    ) -> Result<Level2Verdict, BackendError> {
        Ok(validate_level2(solution))
    }
}
