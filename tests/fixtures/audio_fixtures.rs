//! Audio Test Fixtures
//!
//! Programmatically generated WAV data, so tests have no external file
//! dependencies and exact control over duration and layout.
//!
//! Default format:
//! - Sample rate: 16kHz (16000 Hz)
//! - Bit depth: 16-bit signed PCM
//! - Channels: Mono

use std::f32::consts::PI;
use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// Default fixture sample rate
pub const SAMPLE_RATE: u32 = 16000;

/// Generate silence (zeros)
pub fn generate_silence(duration_samples: usize) -> Vec<i16> {
    vec![0i16; duration_samples]
}

/// Generate a sine wave tone at `SAMPLE_RATE`
pub fn generate_sine_wave(duration_samples: usize, frequency: f32, amplitude: f32) -> Vec<i16> {
    let max_amplitude = amplitude * i16::MAX as f32;
    let angular_freq = 2.0 * PI * frequency / SAMPLE_RATE as f32;

    (0..duration_samples)
        .map(|i| ((angular_freq * i as f32).sin() * max_amplitude) as i16)
        .collect()
}

/// A ramp whose value identifies the sample index, handy for checking which
/// part of a recording survived a splice.
pub fn generate_index_ramp(duration_samples: usize) -> Vec<i16> {
    (0..duration_samples)
        .map(|i| ((i % 30000) as i32 - 15000) as i16)
        .collect()
}

/// Encode interleaved 16-bit samples as a WAV file
pub fn wav_bytes(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        for &sample in samples {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Encode interleaved integer samples at any PCM bit depth hound supports
pub fn wav_bytes_at_depth(samples: &[i32], sample_rate: u32, channels: u16, bits: u16) -> Vec<u8> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: bits,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        for &sample in samples {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Mono silence of the given duration at `SAMPLE_RATE`
pub fn silence_wav(duration_secs: f64) -> Vec<u8> {
    let samples = (duration_secs * SAMPLE_RATE as f64).round() as usize;
    wav_bytes(&generate_silence(samples), SAMPLE_RATE, 1)
}

/// Mono 440 Hz tone of the given duration at `SAMPLE_RATE`
pub fn tone_wav(duration_secs: f64) -> Vec<u8> {
    let samples = (duration_secs * SAMPLE_RATE as f64).round() as usize;
    wav_bytes(&generate_sine_wave(samples, 440.0, 0.5), SAMPLE_RATE, 1)
}

/// Decoded WAV header and samples
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl WavInfo {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// Read a 16-bit WAV produced by the gateway
pub fn read_wav(bytes: &[u8]) -> WavInfo {
    let mut reader = WavReader::new(Cursor::new(bytes)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.bits_per_sample, 16, "gateway output should be 16-bit");
    let samples = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        samples,
    }
}

/// Header and raw integer samples of a PCM WAV at any bit depth
pub fn read_wav_raw(bytes: &[u8]) -> (WavSpec, Vec<i32>) {
    let mut reader = WavReader::new(Cursor::new(bytes)).unwrap();
    let spec = reader.spec();
    let samples = reader.samples::<i32>().map(|s| s.unwrap()).collect();
    (spec, samples)
}

/// Duration of a WAV file in seconds
pub fn wav_duration_secs(bytes: &[u8]) -> f64 {
    read_wav(bytes).duration_secs()
}

/// Assert two durations agree to within one frame at `SAMPLE_RATE`
pub fn assert_duration(actual: f64, expected: f64) {
    let tolerance = 1.5 / SAMPLE_RATE as f64;
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected:.5}s, got {actual:.5}s"
    );
}
