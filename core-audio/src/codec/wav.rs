//! In-process WAV encoder.

use super::pcm::encode_wav;
use super::AudioEncoder;
use crate::buffer::AudioBuffer;
use crate::error::{AudioError, Result};
use async_trait::async_trait;
use bytes::Bytes;

/// Encodes 16-bit PCM WAV on a blocking thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavEncoder;

impl WavEncoder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioEncoder for WavEncoder {
    fn content_type(&self) -> &str {
        "audio/wav"
    }

    fn file_extension(&self) -> &str {
        "wav"
    }

    async fn encode(&self, buffer: &AudioBuffer) -> Result<Bytes> {
        let buffer = buffer.clone();
        let data = tokio::task::spawn_blocking(move || encode_wav(&buffer))
            .await
            .map_err(|e| AudioError::Internal(format!("WAV encode task failed: {}", e)))??;
        Ok(Bytes::from(data))
    }
}
