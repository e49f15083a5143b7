//! # Codec Adapter
//!
//! Conversion between compressed audio bytes and [`AudioBuffer`]s.
//!
//! Decoding always goes through symphonia. Encoding is pluggable through
//! [`AudioEncoder`]: an external program such as LAME for MP3 output, or the
//! in-process WAV writer.
//!
//! Every failure surfaces as [`AudioError::Codec`] (or
//! [`AudioError::EncoderTimeout`]). Nothing here substitutes synthetic audio
//! for input it cannot decode.

mod decoder;
mod external;
mod format_hint;
mod pcm;
mod sample_converter;
mod wav;

pub use decoder::SymphoniaDecoder;
pub use external::ExternalEncoder;
pub use format_hint::{extension_for_mime_type, hint_from_file_name, hint_from_mime_type};
pub use pcm::{encode_wav, sample_to_i16};
pub use wav::WavEncoder;

use crate::buffer::AudioBuffer;
use crate::config::EncoderConfig;
use crate::error::{AudioError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, instrument};

/// Turns a buffer into compressed bytes of one format.
#[async_trait]
pub trait AudioEncoder: Send + Sync {
    /// MIME type of the produced bytes.
    fn content_type(&self) -> &str;

    /// File extension of the produced bytes, without a dot.
    fn file_extension(&self) -> &str;

    async fn encode(&self, buffer: &AudioBuffer) -> Result<Bytes>;
}

/// Encoded bytes plus the format they are in.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedAudio {
    pub data: Bytes,
    pub content_type: String,
    pub extension: String,
}

/// Decode/encode contract used by the upload pipeline.
#[async_trait]
pub trait AudioCodec: Send + Sync {
    async fn decode(&self, data: Bytes) -> Result<AudioBuffer>;

    async fn encode(&self, buffer: &AudioBuffer) -> Result<EncodedAudio>;
}

/// Build the encoder selected by `config`.
pub fn encoder_from_config(config: &EncoderConfig) -> Result<Box<dyn AudioEncoder>> {
    Ok(match config.program {
        Some(_) => Box::new(ExternalEncoder::from_config(config)?),
        None => Box::new(WavEncoder::new()),
    })
}

/// [`AudioCodec`] composed of the symphonia decoder and any encoder.
pub struct CodecAdapter {
    decoder: SymphoniaDecoder,
    encoder: Box<dyn AudioEncoder>,
}

impl CodecAdapter {
    pub fn new(decoder: SymphoniaDecoder, encoder: Box<dyn AudioEncoder>) -> Self {
        Self { decoder, encoder }
    }

    /// MP3-in adapter with the encoder chosen by `config`.
    pub fn from_config(config: &EncoderConfig) -> Result<Self> {
        Ok(Self::new(
            SymphoniaDecoder::with_mime_type("audio/mpeg"),
            encoder_from_config(config)?,
        ))
    }

    pub fn encoder(&self) -> &dyn AudioEncoder {
        self.encoder.as_ref()
    }
}

#[async_trait]
impl AudioCodec for CodecAdapter {
    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn decode(&self, data: Bytes) -> Result<AudioBuffer> {
        let decoder = self.decoder.clone();
        let buffer = tokio::task::spawn_blocking(move || decoder.decode(data))
            .await
            .map_err(|e| AudioError::Internal(format!("decode task failed: {}", e)))??;
        debug!(
            frames = buffer.length(),
            channels = buffer.number_of_channels(),
            "Decoded upload"
        );
        Ok(buffer)
    }

    #[instrument(skip(self, buffer), fields(frames = buffer.length()))]
    async fn encode(&self, buffer: &AudioBuffer) -> Result<EncodedAudio> {
        let data = self.encoder.encode(buffer).await?;
        Ok(EncodedAudio {
            data,
            content_type: self.encoder.content_type().to_string(),
            extension: self.encoder.file_extension().to_string(),
        })
    }
}
