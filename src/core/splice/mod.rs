//! Placeholder splicing.
//!
//! Replaces time windows of a base recording with synthesized speech (or
//! removes them when the replacement text is empty) and re-encodes the result
//! as WAV in the base recording's sample rate and channel layout.

mod placeholder;
mod splicer;

use thiserror::Error;

use crate::core::audio::AudioError;
use crate::core::tts::SynthesisError;

pub use placeholder::{Placeholder, parse_placeholders, validate_and_sort};
pub use splicer::PlaceholderSplicer;

/// Result type for splice operations
pub type SpliceResult<T> = Result<T, SpliceError>;

#[derive(Debug, Error)]
pub enum SpliceError {
    /// Placeholder input is malformed; nothing was synthesized
    #[error("Invalid placeholders: {0}")]
    Validation(String),

    /// The uploaded recording could not be decoded
    #[error("Could not decode base audio: {0}")]
    BaseDecode(#[source] AudioError),

    /// The voice engine returned audio that could not be decoded
    #[error("Could not decode synthesized audio: {0}")]
    SynthesizedDecode(#[source] AudioError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// Layout conversion or WAV encoding failed
    #[error("Failed to assemble audio: {0}")]
    Assembly(#[source] AudioError),

    #[error("Audio processing task failed: {0}")]
    Task(String),
}
