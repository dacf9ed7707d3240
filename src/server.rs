//! REST surface over a session store.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/api/game/{session_id}` | Session, created on first access |
//! | PATCH | `/api/game/{session_id}` | Merge a partial session |
//! | POST | `/api/game/{session_id}/validate-level2` | Check a logic grid answer |
//!
//! CORS is open to every origin, method and header; `OPTIONS` answers 200.

use crate::error::{StoreError, StoreErrorKind};
use crate::levels::{Level2Submission, Level2Verdict, validate_level2_submission};
use crate::session::{GameSession, SessionPatch, SessionStore};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    store: Arc<dyn SessionStore>,
}

impl AppState {
    /// Wraps a store for the router.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }
}

/// Builds the game API router.
#[instrument(skip(store))]
pub fn create_router(store: Arc<dyn SessionStore>) -> Router {
    info!("Building game API router");
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/game/{session_id}", get(get_session).patch(patch_session))
        .route("/api/game/{session_id}/validate-level2", post(check_level2))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(AppState::new(store))
}

/// Error body `{ "message": ... }` with a status code.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    fn bad_request(message: &'static str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
        }
    }

    fn internal(message: &'static str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "message": self.message })),
        )
            .into_response()
    }
}

#[instrument(skip(state))]
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<GameSession>, ApiError> {
    state.store.get_or_create(&session_id).map(Json).map_err(|e| {
        error!(error = %e, "Failed to get game session");
        ApiError::internal("Failed to get game session")
    })
}

#[instrument(skip(state, payload))]
async fn patch_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<SessionPatch>, JsonRejection>,
) -> Result<Json<GameSession>, ApiError> {
    let Json(patch) = payload.map_err(|rejection| {
        warn!(error = %rejection, "Rejected session update body");
        ApiError::bad_request("Invalid game session data")
    })?;

    state
        .store
        .update(&session_id, &patch)
        .map(Json)
        .map_err(|e: StoreError| match e.kind {
            StoreErrorKind::Validation(_) => {
                warn!(error = %e, "Session update failed validation");
                ApiError::bad_request("Invalid game session data")
            }
            StoreErrorKind::NotFound(_) | StoreErrorKind::Storage(_) => {
                error!(error = %e, "Failed to update game session");
                ApiError::internal("Failed to update game session")
            }
        })
}

#[instrument(skip(payload))]
async fn check_level2(
    Path(session_id): Path<String>,
    payload: Result<Json<Level2Submission>, JsonRejection>,
) -> Result<Json<Level2Verdict>, ApiError> {
    // Only a body that is not a JSON object is rejected.
    let Json(submission) = payload.map_err(|rejection| {
        warn!(error = %rejection, "Rejected level 2 body");
        ApiError::bad_request("Invalid solution data")
    })?;
    Ok(Json(validate_level2_submission(&submission)))
}
