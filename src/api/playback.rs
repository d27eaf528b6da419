//! Playback control endpoints
//!
//! Thin wrappers over the shared [`PlaybackHandle`](crate::audio::PlaybackHandle).

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState};
use crate::audio::PlaybackStatus;

/// Build playback router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/playback/play", post(play))
        .route("/playback/toggle", post(toggle))
        .route("/playback/stop", post(stop))
        .route("/playback/status", get(status))
        .with_state(state)
}

/// Play request
#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    /// Base64 PCM, optionally as a data URI
    pub payload: String,
}

/// Current playback status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: PlaybackStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<u64>,
}

impl StatusResponse {
    const fn new(status: PlaybackStatus) -> Self {
        Self {
            status,
            session: None,
        }
    }
}

/// Replace whatever is playing with `payload`
async fn play(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<PlayRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let session = state.playback.play(request.payload).await?;
    Ok(Json(StatusResponse {
        status: state.playback.status(),
        session: Some(session.get()),
    }))
}

/// Pause when playing, resume when paused
async fn toggle(State(state): State<Arc<ApiState>>) -> Result<Json<StatusResponse>, ApiError> {
    let status = state.playback.pause_or_resume().await?;
    Ok(Json(StatusResponse::new(status)))
}

async fn stop(State(state): State<Arc<ApiState>>) -> Result<Json<StatusResponse>, ApiError> {
    state.playback.stop().await?;
    Ok(Json(StatusResponse::new(state.playback.status())))
}

async fn status(State(state): State<Arc<ApiState>>) -> Json<StatusResponse> {
    Json(StatusResponse::new(state.playback.status()))
}
