//! `Range` header parsing
//!
//! Only single byte ranges are served. An `end` past the last byte is
//! clamped; every other unsatisfiable or malformed header is rejected with
//! [`StreamError::RangeNotSatisfiable`].

use crate::error::{Result, StreamError};

/// Inclusive byte range `[start, end]` within a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub start: u64,
    pub end: u64,
}

impl RangeSpec {
    /// The whole of a non-empty resource.
    pub fn full(size: u64) -> Option<Self> {
        size.checked_sub(1).map(|end| Self { start: 0, end })
    }

    /// Number of bytes covered.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// A range always covers at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// `Content-Range` value for a resource of `size` bytes.
    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, size)
    }
}

/// Parse a `Range` header against a resource of `size` bytes.
///
/// Accepts `bytes=S-E`, `bytes=S-` and `bytes=-N`. The unit is matched
/// case-insensitively and surrounding whitespace is ignored.
pub fn parse_range(header: &str, size: u64) -> Result<RangeSpec> {
    let header = header.trim();
    let spec = header
        .get(..6)
        .filter(|unit| unit.eq_ignore_ascii_case("bytes="))
        .map(|_| header[6..].trim())
        .ok_or_else(|| StreamError::unsatisfiable(size, "only the bytes unit is supported"))?;

    if spec.contains(',') {
        return Err(StreamError::unsatisfiable(
            size,
            "multiple ranges are not supported",
        ));
    }

    let (first, last) = spec
        .split_once('-')
        .ok_or_else(|| StreamError::unsatisfiable(size, format!("malformed range '{}'", spec)))?;
    let (first, last) = (first.trim(), last.trim());

    let Some(last_byte) = size.checked_sub(1) else {
        return Err(StreamError::unsatisfiable(size, "resource is empty"));
    };

    if first.is_empty() {
        let suffix = parse_bound(last, size)?;
        if suffix == 0 {
            return Err(StreamError::unsatisfiable(size, "suffix length is zero"));
        }
        return Ok(RangeSpec {
            start: size.saturating_sub(suffix),
            end: last_byte,
        });
    }

    let start = parse_bound(first, size)?;
    if start > last_byte {
        return Err(StreamError::unsatisfiable(
            size,
            format!("start {} is beyond the last byte", start),
        ));
    }

    let end = if last.is_empty() {
        last_byte
    } else {
        let end = parse_bound(last, size)?;
        if end < start {
            return Err(StreamError::unsatisfiable(
                size,
                format!("end {} precedes start {}", end, start),
            ));
        }
        end.min(last_byte)
    };

    Ok(RangeSpec { start, end })
}

fn parse_bound(raw: &str, size: u64) -> Result<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StreamError::unsatisfiable(
            size,
            format!("invalid range bound '{}'", raw),
        ));
    }
    // Digits only, so the sole failure mode is overflow.
    raw.parse::<u64>().or(Ok(u64::MAX))
}
