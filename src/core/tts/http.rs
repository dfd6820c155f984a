//! HTTP voice engine client.
//!
//! Talks to any server exposing an OpenAI-compatible speech endpoint
//! (`POST /v1/audio/speech`). The request always asks for WAV output; the
//! VITS knobs (`speaker_id`, `length_scale`, `noise_scale`, `noise_w`,
//! `sentence_silence`) travel as extra JSON fields that compatible servers
//! forward to the model and others ignore.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::json;
use url::Url;

use super::{SynthesisError, SynthesisOptions, SynthesisResult, Synthesizer};

/// Longest error body echoed back from the engine
const MAX_ERROR_BODY_CHARS: usize = 512;

pub struct HttpSynthesizer {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpSynthesizer {
    pub fn new(endpoint: &str, api_key: Option<String>, timeout: Duration) -> SynthesisResult<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            SynthesisError::InvalidConfiguration(format!("invalid synthesis URL '{endpoint}': {e}"))
        })?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(SynthesisError::InvalidConfiguration(format!(
                "synthesis URL must use http or https, got '{}'",
                endpoint.scheme()
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SynthesisError::InvalidConfiguration(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.filter(|key| !key.is_empty()),
        })
    }

    fn build_request(&self, text: &str, options: &SynthesisOptions) -> reqwest::RequestBuilder {
        let mut body = json!({
            "input": text,
            "response_format": "wav",
        });

        if let Some(model) = &options.model {
            body["model"] = json!(model);
        }
        if let Some(voice) = &options.voice {
            body["voice"] = json!(voice);
        }
        if let Some(speaker_id) = options.speaker_id {
            body["speaker_id"] = json!(speaker_id);
        }
        if let Some(length_scale) = options.length_scale {
            body["length_scale"] = json!(length_scale);
        }
        if let Some(noise_scale) = options.noise_scale {
            body["noise_scale"] = json!(noise_scale);
        }
        if let Some(noise_w) = options.noise_w {
            body["noise_w"] = json!(noise_w);
        }
        if options.sentence_silence > 0.0 {
            body["sentence_silence"] = json!(options.sentence_silence);
        }

        let request = self
            .client
            .post(self.endpoint.clone())
            .header("Accept", "audio/wav")
            .json(&body);

        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl Synthesizer for HttpSynthesizer {
    async fn synthesize(&self, text: &str, options: &SynthesisOptions) -> SynthesisResult<Bytes> {
        tracing::debug!(
            "Requesting synthesis of {} chars from {}",
            text.chars().count(),
            self.endpoint
        );

        let response = self
            .build_request(text, options)
            .send()
            .await
            .map_err(|e| SynthesisError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            tracing::error!("Voice engine returned {}: {}", status, message);
            return Err(SynthesisError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::RequestFailed(e.to_string()))?;

        if audio.is_empty() {
            return Err(SynthesisError::EmptyAudio);
        }

        Ok(audio)
    }

    fn name(&self) -> &str {
        "http"
    }
}
