//! 16-bit PCM conversion and WAV serialisation.

use crate::buffer::AudioBuffer;
use crate::error::{AudioError, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;

/// Convert a float sample to signed 16-bit PCM.
///
/// Input is clamped to [-1.0, 1.0]. Negative values scale by 32768 and
/// positive values by 32767 so both extremes map onto the full range.
pub fn sample_to_i16(sample: f32) -> i16 {
    let clamped = if sample.is_nan() {
        0.0
    } else {
        sample.clamp(-1.0, 1.0)
    };

    if clamped < 0.0 {
        (clamped * 32_768.0) as i16
    } else {
        (clamped * 32_767.0) as i16
    }
}

/// Serialise `buffer` as an interleaved 16-bit PCM WAV file.
pub fn encode_wav(buffer: &AudioBuffer) -> Result<Vec<u8>> {
    let channels = u16::try_from(buffer.number_of_channels()).map_err(|_| {
        AudioError::Codec(format!(
            "{} channels exceed the WAV channel limit",
            buffer.number_of_channels()
        ))
    })?;
    let spec = WavSpec {
        channels,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(
        44 + buffer.length() * buffer.number_of_channels() * 2,
    ));
    {
        let mut writer = WavWriter::new(&mut cursor, spec).map_err(wav_error)?;
        for frame in 0..buffer.length() {
            for channel in buffer.channels() {
                writer
                    .write_sample(sample_to_i16(channel[frame]))
                    .map_err(wav_error)?;
            }
        }
        writer.finalize().map_err(wav_error)?;
    }

    Ok(cursor.into_inner())
}

fn wav_error(e: hound::Error) -> AudioError {
    match e {
        hound::Error::IoError(io) => AudioError::Io(io),
        other => AudioError::Codec(format!("WAV encoding failed: {}", other)),
    }
}
