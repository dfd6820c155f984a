use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use super::{AudioError, AudioResult};

const RESAMPLE_CHUNK_SIZE: usize = 1024;

/// Sample encoding of the source a segment was decoded from, used again when
/// the segment is written back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleDepth {
    /// Signed integer PCM of 8, 16, 24 or 32 bits
    Int(u16),
    /// IEEE 32-bit float
    Float32,
}

impl SampleDepth {
    pub const PCM_16: SampleDepth = SampleDepth::Int(16);

    /// Nearest supported depth for a source bit width.
    pub fn int(bits: u16) -> Self {
        match bits {
            0..=8 => SampleDepth::Int(8),
            9..=16 => SampleDepth::Int(16),
            17..=24 => SampleDepth::Int(24),
            _ => SampleDepth::Int(32),
        }
    }

    pub fn bits_per_sample(&self) -> u16 {
        match self {
            SampleDepth::Int(bits) => *bits,
            SampleDepth::Float32 => 32,
        }
    }
}

/// An in-memory audio buffer.
///
/// Samples are interleaved f32 in `[-1.0, 1.0]`. Slicing is by time in
/// seconds and always clamps to the buffer, so out-of-range windows yield a
/// shorter (possibly empty) segment rather than an error.
///
/// The segment remembers the sample depth of its source. Derived segments
/// (slices, conversions) keep it, and appended audio takes the depth of the
/// segment it is appended to.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
    depth: SampleDepth,
}

impl AudioSegment {
    /// Build a segment from interleaved samples.
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> AudioResult<Self> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidLayout(
                "sample rate must be greater than zero".to_string(),
            ));
        }
        if channels == 0 {
            return Err(AudioError::InvalidLayout(
                "channel count must be greater than zero".to_string(),
            ));
        }
        if samples.len() % channels as usize != 0 {
            return Err(AudioError::InvalidLayout(format!(
                "{} samples is not a whole number of {}-channel frames",
                samples.len(),
                channels
            )));
        }

        Ok(Self {
            samples,
            sample_rate,
            channels,
            depth: SampleDepth::PCM_16,
        })
    }

    /// Same samples, written out at `depth`.
    pub fn with_depth(mut self, depth: SampleDepth) -> Self {
        self.depth = depth;
        self
    }

    /// Segment with no frames in the given layout.
    pub fn empty(sample_rate: u32, channels: u16) -> AudioResult<Self> {
        Self::new(Vec::new(), sample_rate, channels)
    }

    /// Digital silence of `duration_secs` seconds.
    pub fn silent(duration_secs: f64, sample_rate: u32, channels: u16) -> AudioResult<Self> {
        let frames = (duration_secs.max(0.0) * sample_rate as f64).round() as usize;
        Self::new(vec![0.0; frames * channels as usize], sample_rate, channels)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn depth(&self) -> SampleDepth {
        self.depth
    }

    /// Interleaved samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Frame index for a timestamp, clamped to `[0, frames]`.
    pub fn frame_at(&self, secs: f64) -> usize {
        if !secs.is_finite() || secs <= 0.0 {
            return 0;
        }
        let frame = (secs * self.sample_rate as f64).round();
        (frame as usize).min(self.frames())
    }

    /// Copy of the window `[start_secs, end_secs)`; `None` runs to the end.
    pub fn slice(&self, start_secs: f64, end_secs: Option<f64>) -> Self {
        let start = self.frame_at(start_secs);
        let end = end_secs
            .map(|secs| self.frame_at(secs))
            .unwrap_or_else(|| self.frames())
            .max(start);

        let channels = self.channels as usize;
        Self {
            samples: self.samples[start * channels..end * channels].to_vec(),
            sample_rate: self.sample_rate,
            channels: self.channels,
            depth: self.depth,
        }
    }

    /// Whether `other` shares this segment's sample rate and channel count.
    pub fn same_layout(&self, other: &AudioSegment) -> bool {
        self.sample_rate == other.sample_rate && self.channels == other.channels
    }

    /// Convert to another layout, mixing channels first and resampling second.
    pub fn convert(&self, sample_rate: u32, channels: u16) -> AudioResult<Self> {
        if self.sample_rate == sample_rate && self.channels == channels {
            return Ok(self.clone());
        }

        let remixed = self.remix(channels)?;
        if remixed.sample_rate == sample_rate {
            return Ok(remixed);
        }
        remixed.resample(sample_rate)
    }

    /// Append `other`, converting it to this segment's layout when needed.
    pub fn append(&mut self, other: &AudioSegment) -> AudioResult<()> {
        if self.same_layout(other) {
            self.samples.extend_from_slice(&other.samples);
        } else {
            let converted = other.convert(self.sample_rate, self.channels)?;
            self.samples.extend(converted.samples);
        }
        Ok(())
    }

    /// Concatenate segments in order into one buffer with the given layout.
    pub fn concat<'a>(
        sample_rate: u32,
        channels: u16,
        segments: impl IntoIterator<Item = &'a AudioSegment>,
    ) -> AudioResult<Self> {
        let mut output = Self::empty(sample_rate, channels)?;
        for segment in segments {
            output.append(segment)?;
        }
        Ok(output)
    }

    fn remix(&self, channels: u16) -> AudioResult<Self> {
        if channels == 0 {
            return Err(AudioError::InvalidLayout(
                "channel count must be greater than zero".to_string(),
            ));
        }
        if self.channels == channels {
            return Ok(self.clone());
        }

        let source_channels = self.channels as usize;
        let target_channels = channels as usize;

        // Collapse to mono first; mono fans out to any channel count.
        let mono: Vec<f32> = if source_channels == 1 {
            self.samples.clone()
        } else {
            self.samples
                .chunks_exact(source_channels)
                .map(|frame| frame.iter().sum::<f32>() / source_channels as f32)
                .collect()
        };

        let samples = if target_channels == 1 {
            mono
        } else {
            mono.iter()
                .flat_map(|&sample| std::iter::repeat_n(sample, target_channels))
                .collect()
        };

        Ok(Self::new(samples, self.sample_rate, channels)?.with_depth(self.depth))
    }

    fn resample(&self, sample_rate: u32) -> AudioResult<Self> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidLayout(
                "sample rate must be greater than zero".to_string(),
            ));
        }
        if self.is_empty() {
            return Ok(Self::empty(sample_rate, self.channels)?.with_depth(self.depth));
        }

        let channels = self.channels as usize;
        let ratio = sample_rate as f64 / self.sample_rate as f64;
        let frames = self.frames();
        let expected_frames = (frames as f64 * ratio).round() as usize;

        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let mut resampler =
            SincFixedIn::<f32>::new(ratio, 2.0, params, RESAMPLE_CHUNK_SIZE, channels)
                .map_err(|e| AudioError::Resample(format!("resampler init: {e}")))?;

        let planar: Vec<Vec<f32>> = (0..channels)
            .map(|ch| {
                self.samples
                    .iter()
                    .skip(ch)
                    .step_by(channels)
                    .copied()
                    .collect()
            })
            .collect();

        let mut output: Vec<Vec<f32>> =
            vec![Vec::with_capacity(expected_frames + 2 * RESAMPLE_CHUNK_SIZE); channels];

        // The sinc filter delays its output; keep feeding zero-padded chunks
        // until the delayed tail has come out, then drop the lead-in.
        let delay = resampler.output_delay();
        let needed = expected_frames + delay;

        let mut offset = 0;
        while output.first().map_or(0, Vec::len) < needed {
            let start = offset.min(frames);
            let end = (offset + RESAMPLE_CHUNK_SIZE).min(frames);
            let chunk: Vec<Vec<f32>> = planar
                .iter()
                .map(|channel| {
                    let mut part = channel[start..end].to_vec();
                    part.resize(RESAMPLE_CHUNK_SIZE, 0.0);
                    part
                })
                .collect();

            let processed = resampler
                .process(&chunk, None)
                .map_err(|e| AudioError::Resample(format!("resample: {e}")))?;

            for (out, part) in output.iter_mut().zip(processed) {
                out.extend(part);
            }
            offset += RESAMPLE_CHUNK_SIZE;
        }

        for channel in output.iter_mut() {
            channel.drain(..delay.min(channel.len()));
            channel.resize(expected_frames, 0.0);
        }

        let mut samples = Vec::with_capacity(expected_frames * channels);
        for frame in 0..expected_frames {
            for channel in &output {
                samples.push(channel[frame]);
            }
        }

        Ok(Self::new(samples, sample_rate, self.channels)?.with_depth(self.depth))
    }
}
