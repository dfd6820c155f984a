use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info};

use super::{Placeholder, SpliceError, SpliceResult, validate_and_sort};
use crate::core::audio::{self, AudioResult, AudioSegment};
use crate::core::tts::{SynthesisOptions, Synthesizer};

/// Format hint for voice engine output. The decoder still sniffs the bytes,
/// so engines returning another container work too.
const SYNTHESIZED_FORMAT_HINT: &str = "wav";

/// Splices synthesized speech into placeholder windows of a base recording.
#[derive(Clone)]
pub struct PlaceholderSplicer {
    synthesizer: Arc<dyn Synthesizer>,
    options: SynthesisOptions,
}

impl PlaceholderSplicer {
    pub fn new(synthesizer: Arc<dyn Synthesizer>, options: SynthesisOptions) -> Self {
        Self {
            synthesizer,
            options,
        }
    }

    /// Replace each placeholder window of `base_audio` and return WAV bytes.
    ///
    /// Placeholders may arrive in any order. Validation runs before any
    /// synthesis, voice requests go out one at a time in timeline order, and
    /// any failure aborts the whole splice.
    pub async fn splice(
        &self,
        base_audio: Bytes,
        base_format: &str,
        placeholders: Vec<Placeholder>,
    ) -> SpliceResult<Vec<u8>> {
        let placeholders = validate_and_sort(placeholders)?;

        let format = base_format.to_string();
        let base = run_blocking(move || {
            audio::decode(&base_audio, &format).map_err(SpliceError::BaseDecode)
        })
        .await?;

        debug!(
            "Decoded base audio: {:.3}s at {} Hz, {} channel(s), {} placeholder(s)",
            base.duration_secs(),
            base.sample_rate(),
            base.channels(),
            placeholders.len()
        );

        let mut synthesized: Vec<Option<Bytes>> = Vec::with_capacity(placeholders.len());
        for placeholder in &placeholders {
            if placeholder.is_cut() {
                synthesized.push(None);
                continue;
            }
            let audio = self
                .synthesizer
                .synthesize(&placeholder.text_value, &self.options)
                .await?;
            synthesized.push(Some(audio));
        }

        let output = run_blocking(move || {
            let inserts = synthesized
                .iter()
                .map(|bytes| {
                    bytes
                        .as_ref()
                        .map(|b| audio::decode(b, SYNTHESIZED_FORMAT_HINT))
                        .transpose()
                })
                .collect::<AudioResult<Vec<_>>>()
                .map_err(SpliceError::SynthesizedDecode)?;

            let spliced = assemble(&base, &placeholders, &inserts).map_err(SpliceError::Assembly)?;
            audio::encode_wav(&spliced).map_err(SpliceError::Assembly)
        })
        .await?;

        info!("Spliced recording: {} bytes of WAV output", output.len());
        Ok(output)
    }

    /// Synthesize `text` as a whole and return canonical WAV bytes.
    pub async fn synthesize_text(&self, text: &str) -> SpliceResult<Vec<u8>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SpliceError::Validation("No text provided".to_string()));
        }

        let audio = self.synthesizer.synthesize(text, &self.options).await?;

        run_blocking(move || {
            let segment = audio::decode(&audio, SYNTHESIZED_FORMAT_HINT)
                .map_err(SpliceError::SynthesizedDecode)?;
            audio::encode_wav(&segment).map_err(SpliceError::Assembly)
        })
        .await
    }
}

/// Walk sorted placeholders with a cursor, keeping the base audio between
/// windows and inserting synthesized audio (or nothing) for each window.
fn assemble(
    base: &AudioSegment,
    placeholders: &[Placeholder],
    inserts: &[Option<AudioSegment>],
) -> AudioResult<AudioSegment> {
    let mut output =
        AudioSegment::empty(base.sample_rate(), base.channels())?.with_depth(base.depth());
    let mut last_end = 0.0;

    for (placeholder, insert) in placeholders.iter().zip(inserts) {
        if placeholder.start_time > last_end {
            output.append(&base.slice(last_end, Some(placeholder.start_time)))?;
        }
        if let Some(insert) = insert {
            output.append(insert)?;
        }
        last_end = placeholder.end_time;
    }

    if base.frame_at(last_end) < base.frames() {
        output.append(&base.slice(last_end, None))?;
    }

    Ok(output)
}

async fn run_blocking<T, F>(task: F) -> SpliceResult<T>
where
    F: FnOnce() -> SpliceResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| SpliceError::Task(e.to_string()))?
}
