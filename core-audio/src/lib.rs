//! # Core Audio
//!
//! Decoded audio, the pitch-shift resampler and the codec adapter.
//!
//! ## Overview
//!
//! The upload transform is a three step pipeline:
//!
//! ```text
//! compressed bytes ──decode──▶ AudioBuffer ──shift──▶ AudioBuffer ──encode──▶ compressed bytes
//! ```
//!
//! - [`AudioBuffer`] is planar `f32` audio with validated shape.
//! - [`resampler`] reads every channel at `i * factor` with linear or cubic
//!   interpolation, keeping the buffer length.
//! - [`codec`] decodes with symphonia and encodes with an external program
//!   (LAME) or the in-process WAV writer.
//!
//! ## Example
//!
//! ```ignore
//! use core_audio::{AudioCodec, CodecAdapter, ProcessingConfig};
//!
//! let config = ProcessingConfig::default();
//! let codec = CodecAdapter::from_config(&config.encoder)?;
//!
//! let decoded = codec.decode(mp3_bytes).await?;
//! let shifted = config.shifter().shift(&decoded);
//! let encoded = codec.encode(&shifted).await?;
//! ```

pub mod buffer;
pub mod codec;
pub mod config;
pub mod error;
pub mod resampler;

pub use buffer::AudioBuffer;
pub use codec::{
    AudioCodec, AudioEncoder, CodecAdapter, EncodedAudio, ExternalEncoder, SymphoniaDecoder,
    WavEncoder,
};
pub use config::{EncoderConfig, ProcessingConfig};
pub use error::{AudioError, Result};
pub use resampler::{shift, Interpolation, PitchFactor, PitchShifter, RETUNE_432_FACTOR};
