//! # Symphonia Decoder
//!
//! Decodes a complete compressed file held in memory into an [`AudioBuffer`].

use super::format_hint::hint_from_mime_type;
use super::sample_converter::append_planar;
use crate::buffer::AudioBuffer;
use crate::error::{AudioError, Result};
use bytes::Bytes;
use std::io::Cursor;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, error, instrument, warn};

/// Packets that may fail in a row before the input is considered corrupt.
const MAX_CONSECUTIVE_ERRORS: usize = 10;

/// Whole-file decoder built on symphonia's probe and codec registry.
///
/// Decoding is synchronous and CPU bound; async callers should run it on a
/// blocking thread.
#[derive(Debug, Clone, Default)]
pub struct SymphoniaDecoder {
    mime_type: Option<String>,
}

impl SymphoniaDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that hints the prober with `mime_type`.
    pub fn with_mime_type(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: Some(mime_type.into()),
        }
    }

    fn hint(&self) -> Hint {
        match &self.mime_type {
            Some(mime_type) => hint_from_mime_type(mime_type),
            None => Hint::new(),
        }
    }

    /// Decode every packet of the default track.
    ///
    /// Fails with [`AudioError::Codec`] when the container cannot be probed,
    /// no decodable track exists, too many packets fail in a row, the
    /// channel layout changes mid-stream, or no audio frames were produced.
    #[instrument(skip(self, data), fields(size = data.len()))]
    pub fn decode(&self, data: Bytes) -> Result<AudioBuffer> {
        if data.is_empty() {
            return Err(AudioError::Codec("input is empty".to_string()));
        }

        let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());
        let probed = symphonia::default::get_probe()
            .format(
                &self.hint(),
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| {
                debug!("Format probe failed: {}", e);
                AudioError::Codec(format!("unrecognised audio format: {}", e))
            })?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioError::Codec("no decodable audio track".to_string()))?;
        let track_id = track.id;
        let declared_rate = track.codec_params.sample_rate;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::Codec(format!("unsupported codec: {}", e)))?;

        let mut channels: Vec<Vec<f32>> = Vec::new();
        let mut sample_rate = declared_rate.unwrap_or(0);
        let mut consecutive_errors = 0;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => {
                    warn!("Track list changed mid-stream");
                    return Err(AudioError::Codec(
                        "track list changed mid-stream".to_string(),
                    ));
                }
                Err(e) => {
                    error!("Failed to read packet: {}", e);
                    return Err(AudioError::Codec(format!("failed to read packet: {}", e)));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    consecutive_errors = 0;
                    let spec = *decoded.spec();
                    let count = spec.channels.count();

                    if channels.is_empty() {
                        channels = vec![Vec::new(); count];
                        sample_rate = spec.rate;
                    } else if channels.len() != count || sample_rate != spec.rate {
                        return Err(AudioError::Codec(format!(
                            "stream layout changed from {} ch @ {} Hz to {} ch @ {} Hz",
                            channels.len(),
                            sample_rate,
                            count,
                            spec.rate
                        )));
                    }

                    append_planar(&decoded, &mut channels);
                }
                Err(e @ (SymphoniaError::DecodeError(_) | SymphoniaError::IoError(_))) => {
                    consecutive_errors += 1;
                    warn!(
                        "Skipping corrupted packet (attempt {}/{}): {}",
                        consecutive_errors, MAX_CONSECUTIVE_ERRORS, e
                    );

                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        error!("Too many consecutive decode errors, input is corrupt");
                        return Err(AudioError::Codec(format!(
                            "decoder failure after {} failed packets: {}",
                            MAX_CONSECUTIVE_ERRORS, e
                        )));
                    }
                }
                Err(e) => {
                    error!("Decoder failure: {}", e);
                    return Err(AudioError::Codec(format!("failed to decode packet: {}", e)));
                }
            }
        }

        let frames = channels.first().map(Vec::len).unwrap_or(0);
        if frames == 0 {
            return Err(AudioError::Codec("no audio frames decoded".to_string()));
        }

        debug!(
            channels = channels.len(),
            sample_rate,
            frames,
            "Decoded audio"
        );
        AudioBuffer::new(sample_rate, channels)
            .map_err(|e| AudioError::Codec(format!("decoded audio is malformed: {}", e)))
    }
}
