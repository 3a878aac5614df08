use hound::{SampleFormat, WavReader};
use std::path::Path;
use tracing::debug;

use super::convert::{downmix_to_mono, resample_linear};
use super::error::AudioError;

/// Audio ready for the recognizer: mono 16-bit PCM at a known rate
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedAudio {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl CapturedAudio {
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

pub struct AudioFile {
    pub path: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl AudioFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AudioError> {
        let path = path.as_ref();
        debug!("Opening audio file: {}", path.display());

        let reader = WavReader::open(path)?;
        let spec = reader.spec();

        // Everything is normalised to i16 so the rest of the pipeline has one sample type
        let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, bits) if bits <= 16 => {
                // Narrower depths are scaled up so full scale stays full scale
                let shift = 16 - bits;
                reader
                    .into_samples::<i16>()
                    .map(|s| s.map(|v| v << shift))
                    .collect::<Result<_, _>>()?
            }
            (SampleFormat::Int, bits) if bits <= 32 => {
                let shift = bits - 16;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| (v >> shift) as i16))
                    .collect::<Result<_, _>>()?
            }
            (SampleFormat::Float, 32) => reader
                .into_samples::<f32>()
                .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
                .collect::<Result<_, _>>()?,
            (format, bits) => {
                return Err(AudioError::Unsupported(format!("{:?} {}-bit", format, bits)));
            }
        };

        let duration_seconds = if spec.sample_rate == 0 || spec.channels == 0 {
            0.0
        } else {
            samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64)
        };

        debug!(
            "Audio file loaded: {:.1}s, {}Hz, {} channels, {} samples",
            duration_seconds,
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        Ok(Self {
            path: path.display().to_string(),
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }

    /// Down-mix and resample into what the recognizer expects
    pub fn to_captured(&self, target_sample_rate: u32) -> Result<CapturedAudio, AudioError> {
        if self.samples.is_empty() {
            return Err(AudioError::Empty);
        }

        let mono = downmix_to_mono(&self.samples, self.channels);
        let samples = resample_linear(&mono, self.sample_rate, target_sample_rate);

        Ok(CapturedAudio {
            samples,
            sample_rate: target_sample_rate,
        })
    }
}
