use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::SampleFormat as CodecSampleFormat;

use super::{AudioError, AudioResult, AudioSegment, SampleDepth};

/// Normalize a format hint into a bare lowercase extension.
///
/// Accepts `"wav"`, `".WAV"`, or a whole filename like `"take-2.mp3"`.
/// Empty input falls back to `"wav"`.
pub fn normalize_format_hint(hint: &str) -> String {
    let trimmed = hint.trim();
    let extension = trimmed.rsplit('.').next().unwrap_or(trimmed).trim();
    if extension.is_empty() {
        "wav".to_string()
    } else {
        extension.to_ascii_lowercase()
    }
}

/// Decode audio bytes into an [`AudioSegment`].
///
/// WAV input is read with `hound`; anything hound rejects, and every other
/// format, goes through symphonia format detection with the hint as extension.
pub fn decode(data: &[u8], format_hint: &str) -> AudioResult<AudioSegment> {
    let format = normalize_format_hint(format_hint);

    if format == "wav" || format == "wave" {
        match decode_wav(data) {
            Ok(segment) => return Ok(segment),
            Err(e) => {
                tracing::debug!("hound could not read WAV input, probing instead: {}", e);
            }
        }
    }

    decode_compressed(data, &format)
}

fn decode_wav(data: &[u8]) -> AudioResult<AudioSegment> {
    let mut reader =
        WavReader::new(Cursor::new(data)).map_err(|e| AudioError::decode("wav", e.to_string()))?;
    let spec = reader.spec();

    let depth = match spec.sample_format {
        SampleFormat::Float => SampleDepth::Float32,
        SampleFormat::Int => SampleDepth::int(spec.bits_per_sample),
    };

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| AudioError::decode("wav", e.to_string()))?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|s| s as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| AudioError::decode("wav", e.to_string()))?
        }
    };

    AudioSegment::new(samples, spec.sample_rate, spec.channels)
        .map(|segment| segment.with_depth(depth))
        .map_err(|e| AudioError::decode("wav", e.to_string()))
}

fn decode_compressed(data: &[u8], format: &str) -> AudioResult<AudioSegment> {
    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    hint.with_extension(format);

    let detected = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::decode(format, format!("format detection: {e}")))?;

    let mut reader = detected.format;

    let track = reader
        .default_track()
        .ok_or_else(|| AudioError::decode(format, "no audio track found"))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| AudioError::decode(format, "unknown sample rate"))?;
    let mut channels = codec_params.channels.map(|c| c.count() as u16);
    // Lossy codecs carry no bit depth; they come out as 16-bit PCM.
    let depth = match codec_params.sample_format {
        Some(CodecSampleFormat::F32 | CodecSampleFormat::F64) => SampleDepth::Float32,
        _ => codec_params
            .bits_per_sample
            .map(|bits| SampleDepth::int(bits.min(32) as u16))
            .unwrap_or(SampleDepth::PCM_16),
    };

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::decode(format, format!("codec: {e}")))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(AudioError::decode(format, format!("packet: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!(error = %e, "Skipping corrupt audio frame");
                continue;
            }
            Err(e) => return Err(AudioError::decode(format, format!("decode: {e}"))),
        };

        let spec = *decoded.spec();
        let frames = decoded.frames();
        if frames == 0 {
            continue;
        }
        channels.get_or_insert(spec.channels.count() as u16);

        let mut buffer = SampleBuffer::<f32>::new(frames as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buffer.samples());
    }

    if samples.is_empty() {
        return Err(AudioError::decode(format, "no audio samples decoded"));
    }

    let channels = channels.unwrap_or(1);
    tracing::debug!(
        format = %format,
        sample_rate,
        channels,
        frames = samples.len() / channels.max(1) as usize,
        "Decoded audio via symphonia"
    );

    AudioSegment::new(samples, sample_rate, channels)
        .map(|segment| segment.with_depth(depth))
        .map_err(|e| AudioError::decode(format, e.to_string()))
}

/// Encode a segment as WAV at the segment's sample depth.
pub fn encode_wav(segment: &AudioSegment) -> AudioResult<Vec<u8>> {
    let depth = match segment.depth() {
        SampleDepth::Int(bits) => SampleDepth::int(bits),
        SampleDepth::Float32 => SampleDepth::Float32,
    };
    let spec = WavSpec {
        channels: segment.channels(),
        sample_rate: segment.sample_rate(),
        bits_per_sample: depth.bits_per_sample(),
        sample_format: match depth {
            SampleDepth::Int(_) => SampleFormat::Int,
            SampleDepth::Float32 => SampleFormat::Float,
        },
    };

    let bytes_per_sample = depth.bits_per_sample() as usize / 8;
    let mut cursor = Cursor::new(Vec::with_capacity(
        44 + segment.samples().len() * bytes_per_sample,
    ));
    {
        let mut writer =
            WavWriter::new(&mut cursor, spec).map_err(|e| AudioError::Encode(e.to_string()))?;
        match depth {
            SampleDepth::Float32 => {
                for &sample in segment.samples() {
                    writer
                        .write_sample(sample)
                        .map_err(|e| AudioError::Encode(e.to_string()))?;
                }
            }
            SampleDepth::Int(bits) => {
                for &sample in segment.samples() {
                    writer
                        .write_sample(to_int(sample, bits))
                        .map_err(|e| AudioError::Encode(e.to_string()))?;
                }
            }
        }
        writer
            .finalize()
            .map_err(|e| AudioError::Encode(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

/// Scale a `[-1.0, 1.0]` sample to a signed integer of `bits` width.
#[inline]
fn to_int(sample: f32, bits: u16) -> i32 {
    let scale = (1i64 << (bits - 1)) as f64;
    (sample as f64 * scale).round().clamp(-scale, scale - 1.0) as i32
}
