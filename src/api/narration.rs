//! Story expansion and narration synthesis endpoints

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState};
use crate::catalog::Language;
use crate::narration::{StoryAnalysis, synthesize_uri};

/// Build narration router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/expand-story", post(expand_story))
        .route("/synthesize-audio", post(synthesize_audio))
        .with_state(state)
}

/// Story expansion request
#[derive(Debug, Deserialize)]
pub struct ExpandRequest {
    pub story_id: String,
}

/// Synthesis request
#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
    /// Falls back to the configured default language
    pub language: Option<Language>,
}

/// Synthesis response
#[derive(Debug, Serialize)]
pub struct SynthesizeResponse {
    pub audio_uri: String,
}

/// Expand a catalog story into a full narration
async fn expand_story(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ExpandRequest>,
) -> Result<Json<StoryAnalysis>, ApiError> {
    let story = state.catalog.find(&request.story_id)?;
    let analyzer = state
        .analyzer
        .as_ref()
        .ok_or(ApiError::NotConfigured("story analysis not configured (no API key)"))?;

    let analysis = analyzer.analyze(story).await?;
    Ok(Json(analysis))
}

/// Synthesize narration audio as a PCM data URI
async fn synthesize_audio(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<SynthesizeRequest>,
) -> Result<Json<SynthesizeResponse>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".to_string()));
    }

    let synthesizer = state
        .synthesizer
        .as_ref()
        .ok_or(ApiError::NotConfigured("speech synthesis not configured (no API key)"))?;

    let language = request.language.unwrap_or(state.language);
    let audio_uri = synthesize_uri(synthesizer.as_ref(), &request.text, language).await?;

    Ok(Json(SynthesizeResponse { audio_uri }))
}
