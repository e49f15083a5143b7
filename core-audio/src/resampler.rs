//! # Pitch-Shift Resampler
//!
//! Constant-ratio resampling that approximates a pitch shift while keeping
//! the buffer length unchanged.
//!
//! Output sample `i` of every channel is read from the input at position
//! `i * factor`. A factor below 1.0 stretches the waveform and lowers the
//! pitch; the tail that no longer maps onto input samples becomes silence.
//!
//! ## Interpolation tiers
//!
//! | Neighbourhood available | Cubic strategy | Linear strategy |
//! |-------------------------|----------------|-----------------|
//! | `index-1 ..= index+2`   | cubic convolution | linear |
//! | `index ..= index+1`     | linear | linear |
//! | `index` only            | `input[index]` | `input[index]` |
//! | nothing                 | `0.0` | `0.0` |

use crate::buffer::AudioBuffer;
use crate::error::{AudioError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ratio of 432 Hz to 440 Hz concert pitch.
pub const RETUNE_432_FACTOR: f64 = 432.0 / 440.0;

/// Interpolation used to read between input samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Two-point linear interpolation everywhere.
    Linear,
    /// Four-point cubic convolution, falling back to linear near the edges.
    #[default]
    Cubic,
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interpolation::Linear => write!(f, "linear"),
            Interpolation::Cubic => write!(f, "cubic"),
        }
    }
}

impl FromStr for Interpolation {
    type Err = AudioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Interpolation::Linear),
            "cubic" => Ok(Interpolation::Cubic),
            other => Err(AudioError::InvalidInterpolation(other.to_string())),
        }
    }
}

/// Validated resampling ratio: finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct PitchFactor(f64);

impl PitchFactor {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(AudioError::InvalidPitchFactor(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Factor that undoes this one.
    pub fn inverse(self) -> Self {
        Self(1.0 / self.0)
    }

    pub fn is_identity(self) -> bool {
        self.0 == 1.0
    }
}

impl Default for PitchFactor {
    fn default() -> Self {
        Self(RETUNE_432_FACTOR)
    }
}

impl TryFrom<f64> for PitchFactor {
    type Error = AudioError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PitchFactor> for f64 {
    fn from(factor: PitchFactor) -> Self {
        factor.0
    }
}

impl fmt::Display for PitchFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reusable resampler bound to a factor and an interpolation strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PitchShifter {
    factor: PitchFactor,
    interpolation: Interpolation,
}

impl PitchShifter {
    pub fn new(factor: PitchFactor, interpolation: Interpolation) -> Self {
        Self {
            factor,
            interpolation,
        }
    }

    pub fn factor(&self) -> PitchFactor {
        self.factor
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Resample every channel of `buffer`.
    ///
    /// The result keeps the sample rate, channel count and length of the
    /// input. The operation is pure and never fails.
    pub fn shift(&self, buffer: &AudioBuffer) -> AudioBuffer {
        let factor = self.factor.value();
        let interpolation = self.interpolation;
        buffer.map_channels(|input| shift_channel(input, factor, interpolation))
    }
}

/// Resample `buffer` by `factor`.
///
/// `factor` must be finite and positive; validate untrusted values with
/// [`PitchFactor::new`] first. Debug builds panic on a bad factor, release
/// builds return a copy of the input.
pub fn shift(buffer: &AudioBuffer, factor: f64, interpolation: Interpolation) -> AudioBuffer {
    debug_assert!(
        factor.is_finite() && factor > 0.0,
        "pitch factor must be finite and positive, got {}",
        factor
    );
    match PitchFactor::new(factor) {
        Ok(factor) => PitchShifter::new(factor, interpolation).shift(buffer),
        Err(_) => buffer.clone(),
    }
}

fn shift_channel(input: &[f32], factor: f64, interpolation: Interpolation) -> Vec<f32> {
    (0..input.len())
        .map(|i| sample_at(input, i as f64 * factor, interpolation))
        .collect()
}

/// Interpolated value of `input` at fractional `position`.
fn sample_at(input: &[f32], position: f64, interpolation: Interpolation) -> f32 {
    let len = input.len();
    let index = position.floor() as usize;
    let fraction = (position - index as f64) as f32;

    if interpolation == Interpolation::Cubic && index > 0 && index + 2 < len {
        let y0 = input[index - 1];
        let y1 = input[index];
        let y2 = input[index + 1];
        let y3 = input[index + 2];

        let c0 = y1;
        let c1 = 0.5 * (y2 - y0);
        let c2 = y0 - 2.5 * y1 + 2.0 * y2 - 0.5 * y3;
        let c3 = 0.5 * (y3 - y0) + 1.5 * (y1 - y2);

        ((c3 * fraction + c2) * fraction + c1) * fraction + c0
    } else if index + 1 < len {
        input[index] * (1.0 - fraction) + input[index + 1] * fraction
    } else if index < len {
        input[index]
    } else {
        0.0
    }
}
