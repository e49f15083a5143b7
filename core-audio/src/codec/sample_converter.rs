//! # Sample Format Converter
//!
//! Appends decoded symphonia buffers of any sample format to planar `f32`
//! channels normalised to [-1.0, 1.0].

use symphonia::core::audio::{AudioBuffer as SymphoniaBuffer, AudioBufferRef, Signal};
use symphonia::core::conv::IntoSample;
use symphonia::core::sample::{i24, u24, Sample};

/// Append every channel of `decoded` to the matching entry of `channels`.
///
/// `channels` must have one entry per decoded channel.
pub(crate) fn append_planar(decoded: &AudioBufferRef<'_>, channels: &mut [Vec<f32>]) {
    match decoded {
        AudioBufferRef::F32(buf) => extend_from(&**buf, channels, |s: f32| s),
        AudioBufferRef::F64(buf) => extend_from(&**buf, channels, |s: f64| s.into_sample()),
        AudioBufferRef::S32(buf) => extend_from(&**buf, channels, |s: i32| s.into_sample()),
        AudioBufferRef::S24(buf) => extend_from(&**buf, channels, |s: i24| s.into_sample()),
        AudioBufferRef::S16(buf) => extend_from(&**buf, channels, |s: i16| s.into_sample()),
        AudioBufferRef::S8(buf) => extend_from(&**buf, channels, |s: i8| s.into_sample()),
        AudioBufferRef::U32(buf) => extend_from(&**buf, channels, |s: u32| s.into_sample()),
        AudioBufferRef::U24(buf) => extend_from(&**buf, channels, |s: u24| s.into_sample()),
        AudioBufferRef::U16(buf) => extend_from(&**buf, channels, |s: u16| s.into_sample()),
        AudioBufferRef::U8(buf) => extend_from(&**buf, channels, |s: u8| s.into_sample()),
    }
}

fn extend_from<T>(buffer: &SymphoniaBuffer<T>, channels: &mut [Vec<f32>], convert: fn(T) -> f32)
where
    T: Sample + Copy,
{
    for (index, channel) in channels.iter_mut().enumerate() {
        channel.extend(buffer.chan(index).iter().map(|&sample| convert(sample)));
    }
}
