//! # Audio Buffer
//!
//! Planar, in-memory decoded audio shared by the codec and the resampler.

use crate::error::{AudioError, Result};
use std::time::Duration;

/// Decoded audio: one `f32` sample sequence per channel plus a sample rate.
///
/// Invariants, checked on construction:
/// - `sample_rate > 0`
/// - at least one channel
/// - every channel holds exactly `length` samples
///
/// Samples are nominally in `[-1.0, 1.0]`. Values outside that range are
/// kept as-is and clamped by encoders.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Build a buffer from per-channel sample data.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidBuffer(
                "sample rate must be positive".to_string(),
            ));
        }

        let Some(first) = channels.first() else {
            return Err(AudioError::InvalidBuffer(
                "at least one channel is required".to_string(),
            ));
        };

        let length = first.len();
        if let Some((index, channel)) = channels
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != length)
        {
            return Err(AudioError::InvalidBuffer(format!(
                "channel {} has {} samples, expected {}",
                index,
                channel.len(),
                length
            )));
        }

        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Build a buffer of `length` zero samples per channel.
    pub fn silent(sample_rate: u32, number_of_channels: usize, length: usize) -> Result<Self> {
        Self::new(sample_rate, vec![vec![0.0; length]; number_of_channels])
    }

    /// Split interleaved samples (`LRLR...`) into channels.
    pub fn from_interleaved(
        sample_rate: u32,
        number_of_channels: usize,
        samples: &[f32],
    ) -> Result<Self> {
        if number_of_channels == 0 {
            return Err(AudioError::InvalidBuffer(
                "at least one channel is required".to_string(),
            ));
        }
        if samples.len() % number_of_channels != 0 {
            return Err(AudioError::InvalidBuffer(format!(
                "{} interleaved samples do not divide into {} channels",
                samples.len(),
                number_of_channels
            )));
        }

        let length = samples.len() / number_of_channels;
        let mut channels = vec![Vec::with_capacity(length); number_of_channels];
        for frame in samples.chunks_exact(number_of_channels) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        Self::new(sample_rate, channels)
    }

    /// Apply `f` to every channel, keeping the sample rate.
    ///
    /// `f` must return as many samples as it is given.
    pub(crate) fn map_channels<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&[f32]) -> Vec<f32>,
    {
        let channels: Vec<Vec<f32>> = self
            .channels
            .iter()
            .map(|input| {
                let output = f(input);
                debug_assert_eq!(output.len(), input.len());
                output
            })
            .collect();

        Self {
            sample_rate: self.sample_rate,
            channels,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn number_of_channels(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel.
    pub fn length(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// `length / sample_rate`
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.length() as f64 / self.sample_rate as f64)
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.channels.iter().map(Vec::as_slice)
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    /// Interleave channels into a single `LRLR...` sequence.
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut interleaved = Vec::with_capacity(self.length() * self.number_of_channels());
        for frame in 0..self.length() {
            for channel in &self.channels {
                interleaved.push(channel[frame]);
            }
        }
        interleaved
    }
}
