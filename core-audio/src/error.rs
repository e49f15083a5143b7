//! # Audio Error Types
//!
//! Error types for buffer construction, resampling setup and codec work.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while handling audio.
#[derive(Error, Debug)]
pub enum AudioError {
    // ========================================================================
    // Codec Errors
    // ========================================================================
    /// Decode or encode failure. Never replaced by synthetic audio.
    #[error("Codec error: {0}")]
    Codec(String),

    /// External encoder did not finish within its time budget.
    #[error("Encoder timed out after {0:?}")]
    EncoderTimeout(Duration),

    // ========================================================================
    // Data Model Errors
    // ========================================================================
    /// Buffer violates the sample-rate/channel/length invariants.
    #[error("Invalid audio buffer: {0}")]
    InvalidBuffer(String),

    /// Pitch factor must be finite and strictly positive.
    #[error("Invalid pitch factor: {0} (must be finite and > 0)")]
    InvalidPitchFactor(f64),

    /// Unknown interpolation strategy name.
    #[error("Unknown interpolation '{0}' (expected 'linear' or 'cubic')")]
    InvalidInterpolation(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// I/O error, e.g. while staging temporary files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Blocking worker panicked or was cancelled.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AudioError {
    /// Returns `true` if the failure came from decoding or encoding.
    pub fn is_codec_error(&self) -> bool {
        matches!(self, AudioError::Codec(_) | AudioError::EncoderTimeout(_))
    }
}

/// Result type for audio operations.
pub type Result<T> = std::result::Result<T, AudioError>;
