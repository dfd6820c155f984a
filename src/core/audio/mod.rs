//! Decoded audio buffers and the codecs around them.
//!
//! - `segment`: [`AudioSegment`], an interleaved f32 buffer with slicing,
//!   layout conversion and ordered concatenation
//! - `codec`: decode from WAV/MP3/FLAC/OGG (format chosen by hint) and encode to
//!   WAV at the source's sample depth

mod codec;
mod segment;

use thiserror::Error;

pub use codec::{decode, encode_wav, normalize_format_hint};
pub use segment::{AudioSegment, SampleDepth};

/// Result type for audio operations
pub type AudioResult<T> = Result<T, AudioError>;

/// Errors produced while decoding, transforming or encoding audio
#[derive(Debug, Error)]
pub enum AudioError {
    /// Input bytes could not be decoded under the given format
    #[error("Failed to decode {format} audio: {message}")]
    Decode { format: String, message: String },

    /// WAV encoding failed
    #[error("Failed to encode WAV audio: {0}")]
    Encode(String),

    /// Sample rate / channel count / sample count are inconsistent
    #[error("Invalid audio layout: {0}")]
    InvalidLayout(String),

    /// Sample rate conversion failed
    #[error("Failed to resample audio: {0}")]
    Resample(String),
}

impl AudioError {
    pub(crate) fn decode(format: &str, message: impl Into<String>) -> Self {
        Self::Decode {
            format: format.to_string(),
            message: message.into(),
        }
    }
}
