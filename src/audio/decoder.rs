//! Base64 PCM payload decoding
//!
//! Speech payloads are raw signed 16-bit little-endian mono samples, base64
//! encoded, optionally wrapped in a data URI (`data:audio/pcm;base64,...`).

use std::sync::Arc;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::{Error, Result};

/// Sample rate of synthesized speech payloads
pub const PCM_SAMPLE_RATE: u32 = 24000;

/// Standard alphabet, padding optional (payloads are sometimes trimmed),
/// non-zero trailing bits ignored like a browser `atob`
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Normalized mono samples in `[-1.0, 1.0]`
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBuffer {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl DecodedBuffer {
    /// Wrap already-normalized samples
    #[must_use]
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            sample_rate,
        }
    }

    /// Samples, shared without copying
    #[must_use]
    pub fn samples(&self) -> &Arc<[f32]> {
        &self.samples
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback duration in milliseconds
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.samples.len() as u64 * 1000) / u64::from(self.sample_rate)
    }
}

/// Decode a base64 PCM payload into a normalized sample buffer
///
/// Anything up to and including the first comma is treated as a data URI
/// header and dropped. A trailing odd byte is ignored. An empty payload
/// yields an empty buffer.
///
/// # Errors
///
/// Returns `Error::MalformedPayload` if the data is not valid base64
pub fn decode(payload: &str) -> Result<DecodedBuffer> {
    let data = payload
        .split_once(',')
        .map_or(payload, |(_, data)| data);

    let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = PAYLOAD_ENGINE
        .decode(cleaned.as_bytes())
        .map_err(|e| Error::MalformedPayload(e.to_string()))?;

    Ok(DecodedBuffer::new(pcm16_to_f32(&bytes), PCM_SAMPLE_RATE))
}

/// Encode normalized samples as a bare base64 PCM payload
///
/// Samples are clamped to `[-1.0, 1.0]` before conversion.
#[must_use]
pub fn encode(samples: &[f32]) -> String {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        #[allow(clippy::cast_possible_truncation)]
        let value = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    PAYLOAD_ENGINE.encode(bytes)
}

/// Reinterpret little-endian i16 pairs as floats
fn pcm16_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
        .collect()
}
