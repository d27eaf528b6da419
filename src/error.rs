//! Error types for Katha

use thiserror::Error;

/// Result type alias for Katha operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Katha
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio payload is not valid base64 PCM
    #[error("malformed audio payload: {0}")]
    MalformedPayload(String),

    /// Output sink could not be opened, suspended or resumed
    #[error("audio output unavailable: {0}")]
    SinkUnavailable(String),

    /// Playback node error (already stopped, not started)
    #[error("playback node error: {0}")]
    Node(String),

    /// Playback control thread is gone
    #[error("playback controller stopped")]
    ControllerClosed,

    /// Synthesis returned no audio
    #[error("the speech service did not return any audio data")]
    EmptySynthesis,

    /// Story analysis error
    #[error("analysis error: {0}")]
    Analysis(String),

    /// Speech synthesis error
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// Unknown story, region or language
    #[error("not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error is a playback failure the user should be told about
    #[must_use]
    pub const fn is_playback_failure(&self) -> bool {
        matches!(self, Self::MalformedPayload(_) | Self::SinkUnavailable(_))
    }
}
