//! Voice engine doubles

use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use splice_gateway::core::tts::{
    SynthesisError, SynthesisOptions, SynthesisResult, Synthesizer,
};

use super::audio_fixtures::{SAMPLE_RATE, generate_silence, wav_bytes};

/// Returns a fixed length of silence for any text and records each request.
pub struct SilenceSynthesizer {
    duration_secs: f64,
    sample_rate: u32,
    channels: u16,
    requests: Mutex<Vec<String>>,
}

impl SilenceSynthesizer {
    pub fn new(duration_secs: f64) -> Self {
        Self::with_layout(duration_secs, SAMPLE_RATE, 1)
    }

    pub fn with_layout(duration_secs: f64, sample_rate: u32, channels: u16) -> Self {
        Self {
            duration_secs,
            sample_rate,
            channels,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Texts requested so far, in call order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Synthesizer for SilenceSynthesizer {
    async fn synthesize(&self, text: &str, _options: &SynthesisOptions) -> SynthesisResult<Bytes> {
        self.requests.lock().unwrap().push(text.to_string());
        let frames = (self.duration_secs * self.sample_rate as f64).round() as usize;
        let samples = generate_silence(frames * self.channels as usize);
        Ok(Bytes::from(wav_bytes(&samples, self.sample_rate, self.channels)))
    }

    fn name(&self) -> &str {
        "silence"
    }
}

/// Always fails as if the voice engine returned HTTP 503.
pub struct FailingSynthesizer;

#[async_trait]
impl Synthesizer for FailingSynthesizer {
    async fn synthesize(&self, _text: &str, _options: &SynthesisOptions) -> SynthesisResult<Bytes> {
        Err(SynthesisError::ServerError {
            status: 503,
            message: "model loading".to_string(),
        })
    }

    fn name(&self) -> &str {
        "failing"
    }
}
