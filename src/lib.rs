//! Katha - regional folk story narration with interruptible audio playback
//!
//! This library provides:
//! - A story catalog filtered by region and theme
//! - Story expansion and speech synthesis through Gemini
//! - A playback controller for base64 PCM narrations (play, pause, resume, stop)
//! - An HTTP API over all of the above
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Interfaces                       │
//! │          CLI (katha)     │     HTTP API             │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │   Catalog  │  Narration (Gemini)  │  PlaybackHandle │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │   PlaybackController ─▶ OutputSink (cpal, 24 kHz)   │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod audio;
pub mod catalog;
pub mod config;
pub mod error;
pub mod narration;

pub use audio::{PlaybackHandle, PlaybackStatus};
pub use catalog::{Catalog, FolkStory, Language, Region};
pub use config::Config;
pub use error::{Error, Result};
