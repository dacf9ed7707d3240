//! REST client for a running game server.

use crate::backend::{BackendError, BackendErrorKind, GameBackend};
use crate::levels::{GridSolution, Level2Verdict};
use crate::session::{GameSession, SessionPatch};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

/// Game backend speaking the `/api/game` REST surface.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Creates a client for the server at `base_url` (e.g. `http://localhost:3000`).
    #[instrument]
    pub fn new(base_url: String) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        debug!(%base_url, "Creating HTTP backend");
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn session_url(&self, id: &str) -> String {
        format!("{}/api/game/{}", self.base_url, id)
    }

    /// Decodes a success body, or turns an error status into a [`BackendError`].
    async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or_else(|| status.to_string());
        warn!(status = status.as_u16(), %message, "Server returned error");
        Err(BackendError::new(BackendErrorKind::Status {
            status: status.as_u16(),
            message,
        }))
    }
}

#[async_trait]
impl GameBackend for HttpBackend {
    #[instrument(skip(self))]
    async fn load_session(&self, id: &str) -> Result<GameSession, BackendError> {
        let response = self.client.get(self.session_url(id)).send().await?;
        Self::read(response).await
    }

    #[instrument(skip(self, patch))]
    async fn update_session(&self, id: &str, patch: &SessionPatch) -> Result<GameSession, BackendError> {
        let response = self
            .client
            .patch(self.session_url(id))
            .json(patch)
            .send()
            .await?;
        Self::read(response).await
    }

    #[instrument(skip(self, solution))]
    async fn validate_level2(
        &self,
        id: &str,
        solution: &GridSolution,
    ) -> Result<Level2Verdict, BackendError> {
        let response = self
            .client
            .post(format!("{}/validate-level2", self.session_url(id)))
            .json(solution)
            .send()
            .await?;
        Self::read(response).await
    }
}
