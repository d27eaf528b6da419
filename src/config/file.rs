//! TOML configuration file loading
//!
//! Supports `~/.config/katha/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct KathaConfigFile {
    /// Gemini API settings
    #[serde(default)]
    pub gemini: GeminiFileConfig,

    /// Narration defaults
    #[serde(default)]
    pub narration: NarrationFileConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerFileConfig,
}

/// Gemini API configuration
#[derive(Debug, Default, Deserialize)]
pub struct GeminiFileConfig {
    pub api_key: Option<String>,

    /// API base URL (e.g. a local proxy)
    pub base_url: Option<String>,

    /// Model used for story expansion
    pub analysis_model: Option<String>,

    /// Model used for speech synthesis
    pub tts_model: Option<String>,

    /// Prebuilt voice name (e.g. "Kore")
    pub voice: Option<String>,
}

/// Narration defaults
#[derive(Debug, Default, Deserialize)]
pub struct NarrationFileConfig {
    /// Default narration language (e.g. "English", "Tamil")
    pub language: Option<String>,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,
}

/// Load the TOML config file from the standard path
///
/// Returns `KathaConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> KathaConfigFile {
    config_file_path().map_or_else(KathaConfigFile::default, |path| load_from(&path))
}

/// Load a config file from an explicit path, falling back to defaults
pub fn load_from(path: &Path) -> KathaConfigFile {
    if !path.exists() {
        return KathaConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                KathaConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            KathaConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/katha/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("katha").join("config.toml"))
}
