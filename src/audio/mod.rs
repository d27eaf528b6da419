//! Narration playback
//!
//! Decodes base64 PCM speech payloads and plays them through a single output
//! sink with play / pause / resume / stop control.

mod controller;
mod cpal_backend;
mod decoder;
mod service;
mod sink;
mod status;

pub use controller::{FinishRouter, PlaybackController, PlaybackNotice, SessionId};
pub use cpal_backend::{CpalBackend, CpalNode, CpalSink};
pub use decoder::{DecodedBuffer, PCM_SAMPLE_RATE, decode, encode};
pub use service::PlaybackHandle;
pub use sink::{AudioBackend, CompletionCallback, OutputSink, PlaybackNode, SinkState};
pub use status::{PlaybackStatus, StatusProjector};
