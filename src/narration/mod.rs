//! Story analysis and narration synthesis
//!
//! The two remote services are modelled as traits so the API and CLI can run
//! against Gemini in production and fakes in tests.

mod gemini;
pub mod prompt;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::{FolkStory, Language};
use crate::{Error, Result};

/// Data URI header for synthesized PCM narrations
pub const PCM_DATA_URI_PREFIX: &str = "data:audio/pcm;base64,";

/// Expanded narration with emotional and cultural metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryAnalysis {
    pub full_narration: String,
    pub emotion: String,
    /// 1 to 10
    #[serde(deserialize_with = "deserialize_intensity")]
    pub intensity: u8,
    #[serde(default)]
    pub cultural_nuances: Vec<String>,
    pub historical_context: String,
    pub significance: String,
    /// Narration audio as a PCM data URI, once synthesized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_uri: Option<String>,
}

impl StoryAnalysis {
    /// Attach synthesized audio
    #[must_use]
    pub fn with_audio(mut self, audio_uri: String) -> Self {
        self.audio_uri = Some(audio_uri);
        self
    }
}

/// Models may answer with a float; clamp into 1..=10
fn deserialize_intensity<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let intensity = value.round().clamp(1.0, 10.0) as u8;
    Ok(intensity)
}

/// Expands a story into a narration with metadata
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// # Errors
    ///
    /// Returns `Error::Analysis` if the service fails or answers badly
    async fn analyze(&self, story: &FolkStory) -> Result<StoryAnalysis>;
}

/// Turns narration text into a base64 PCM payload
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Returns an empty string when the service produced no audio
    ///
    /// # Errors
    ///
    /// Returns `Error::Synthesis` if the service fails
    async fn synthesize(&self, text: &str, language: Language) -> Result<String>;
}

/// Synthesize `text` and wrap it as a PCM data URI
///
/// # Errors
///
/// Returns `Error::EmptySynthesis` if no audio came back, or the synthesizer's
/// error
pub async fn synthesize_uri<S>(synthesizer: &S, text: &str, language: Language) -> Result<String>
where
    S: Synthesizer + ?Sized,
{
    let data = synthesizer.synthesize(text, language).await?;

    if data.trim().is_empty() {
        tracing::warn!(%language, "speech synthesis returned no audio");
        return Err(Error::EmptySynthesis);
    }

    tracing::info!(%language, payload_len = data.len(), "narration audio synthesized");
    Ok(format!("{PCM_DATA_URI_PREFIX}{data}"))
}

/// Synthesize an analysed story's narration
///
/// # Errors
///
/// See [`synthesize_uri`]
pub async fn narrate_audio<S>(
    synthesizer: &S,
    analysis: &StoryAnalysis,
    language: Language,
) -> Result<String>
where
    S: Synthesizer + ?Sized,
{
    synthesize_uri(synthesizer, &analysis.full_narration, language).await
}
