//! Voice synthesis capability.
//!
//! The voice engine is opaque to the rest of the gateway: everything goes
//! through [`Synthesizer::synthesize`], which returns encoded audio bytes
//! (WAV unless the engine decides otherwise; callers auto-detect).

mod http;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SynthesisConfig;

pub use http::HttpSynthesizer;

/// Result type for synthesis operations
pub type SynthesisResult<T> = Result<T, SynthesisError>;

/// Errors reported by a voice engine
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Invalid synthesizer configuration: {0}")]
    InvalidConfiguration(String),

    /// The request never produced a response (connect, timeout, body read)
    #[error("Synthesis request failed: {0}")]
    RequestFailed(String),

    #[error("Voice engine returned HTTP {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Voice engine returned no audio")]
    EmptyAudio,
}

/// Per-request voice parameters.
///
/// Mirrors the knobs of VITS-style engines; unset fields are left to the
/// engine's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthesisOptions {
    pub model: Option<String>,
    pub voice: Option<String>,
    /// Speaker index for multi-speaker models
    pub speaker_id: Option<u32>,
    /// Phoneme length multiplier (higher is slower)
    pub length_scale: Option<f32>,
    /// Generator noise
    pub noise_scale: Option<f32>,
    /// Phoneme width noise
    pub noise_w: Option<f32>,
    /// Seconds of silence appended after each sentence
    pub sentence_silence: f32,
}

impl SynthesisOptions {
    pub fn from_config(config: &SynthesisConfig) -> Self {
        Self {
            model: config.model.clone(),
            voice: config.voice.clone(),
            speaker_id: config.speaker_id,
            length_scale: config.length_scale,
            noise_scale: config.noise_scale,
            noise_w: config.noise_w,
            sentence_silence: config.sentence_silence,
        }
    }
}

/// A text-to-speech engine.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Render `text` to encoded audio.
    async fn synthesize(&self, text: &str, options: &SynthesisOptions) -> SynthesisResult<Bytes>;

    /// Short engine name for logs and health output
    fn name(&self) -> &str;
}

/// Build the configured synthesizer.
pub fn create_synthesizer(config: &SynthesisConfig) -> SynthesisResult<Arc<dyn Synthesizer>> {
    let synthesizer = HttpSynthesizer::new(
        &config.url,
        config.api_key.clone(),
        std::time::Duration::from_secs(config.timeout_seconds),
    )?;
    Ok(Arc::new(synthesizer))
}
