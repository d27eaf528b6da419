//! Configuration management for Katha

pub mod file;

use secrecy::SecretString;

use crate::catalog::Language;
use file::KathaConfigFile;

/// Default API server port
pub const DEFAULT_PORT: u16 = 18800;

/// Katha configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Gemini API settings
    pub gemini: GeminiConfig,

    /// HTTP API server configuration
    pub server: ServerConfig,

    /// Default narration language
    pub language: Language,
}

/// Gemini API configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key (from `GEMINI_API_KEY` or `API_KEY`)
    pub api_key: Option<SecretString>,

    /// REST base URL
    pub base_url: String,

    /// Model used for story expansion
    pub analysis_model: String,

    /// Model used for speech synthesis
    pub tts_model: String,

    /// Prebuilt voice name
    pub voice: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            analysis_model: "gemini-3-pro-preview".to_string(),
            tts_model: "gemini-2.5-flash-preview-tts".to_string(),
            voice: "Kore".to_string(),
        }
    }
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl Config {
    /// Load configuration (env > toml > default)
    #[must_use]
    pub fn load() -> Self {
        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Merge a parsed config file with an environment lookup
    pub fn from_sources<F>(fc: KathaConfigFile, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GeminiConfig::default();

        let api_key = env("GEMINI_API_KEY")
            .or_else(|| env("API_KEY"))
            .or(fc.gemini.api_key)
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);

        let gemini = GeminiConfig {
            api_key,
            base_url: env("KATHA_API_BASE")
                .or(fc.gemini.base_url)
                .unwrap_or(defaults.base_url),
            analysis_model: env("KATHA_ANALYSIS_MODEL")
                .or(fc.gemini.analysis_model)
                .unwrap_or(defaults.analysis_model),
            tts_model: env("KATHA_TTS_MODEL")
                .or(fc.gemini.tts_model)
                .unwrap_or(defaults.tts_model),
            voice: env("KATHA_TTS_VOICE")
                .or(fc.gemini.voice)
                .unwrap_or(defaults.voice),
        };

        let port = env("KATHA_PORT")
            .and_then(|s| s.parse().ok())
            .or(fc.server.port)
            .unwrap_or(DEFAULT_PORT);

        let language = env("KATHA_LANGUAGE")
            .or(fc.narration.language)
            .and_then(|s| match s.parse::<Language>() {
                Ok(language) => Some(language),
                Err(e) => {
                    tracing::warn!(value = %s, error = %e, "unknown narration language, using default");
                    None
                }
            })
            .unwrap_or_default();

        if gemini.api_key.is_none() {
            tracing::debug!("no Gemini API key configured, narration disabled");
        }

        Self {
            gemini,
            server: ServerConfig { port },
            language,
        }
    }
}
