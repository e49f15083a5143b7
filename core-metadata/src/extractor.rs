//! Audio Tag Extraction
//!
//! Extracts tags, duration and embedded artwork from an in-memory file
//! using `lofty`.
//!
//! ## Usage
//!
//! ```ignore
//! use core_metadata::MetadataExtractor;
//!
//! let extractor = MetadataExtractor::new();
//! let tags = extractor.extract_or_default(upload.clone()).await;
//!
//! println!("{} by {} ({} ms)", tags.title, tags.artist, tags.duration_ms);
//! ```
//!
//! Tag reading never blocks an upload: [`MetadataExtractor::extract_or_default`]
//! logs the failure and returns placeholder values instead. It does not
//! touch the audio itself.

use bytes::Bytes;
use lofty::config::ParseOptions;
use lofty::file::{AudioFile, FileType, TaggedFileExt};
use lofty::picture::{MimeType, PictureType};
use lofty::probe::Probe;
use lofty::tag::{Accessor, Tag};
use serde::Serialize;
use std::io::Cursor;
use tracing::{debug, warn};

use crate::error::{MetadataError, Result};

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Raw metadata read from a file; absent tags stay `None`.
#[derive(Debug, Clone)]
pub struct ExtractedMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<i32>,

    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Bitrate in kbps
    pub bitrate: Option<u32>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u8>,
    pub mime_type: String,

    /// Embedded pictures, front cover first
    pub artwork: Vec<ExtractedArtwork>,
}

/// Embedded picture
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedArtwork {
    pub data: Bytes,
    /// e.g. `image/jpeg`
    pub mime_type: String,
    pub picture_type: ArtworkType,
}

impl ExtractedArtwork {
    /// Subtype of the MIME type, used as file extension (`image/png` → `png`).
    pub fn file_extension(&self) -> &str {
        self.mime_type
            .split_once('/')
            .map(|(_, subtype)| subtype)
            .filter(|s| !s.is_empty())
            .unwrap_or("jpg")
    }
}

/// Type of embedded picture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArtworkType {
    CoverFront,
    CoverBack,
    Artist,
    Other,
}

impl From<PictureType> for ArtworkType {
    fn from(picture_type: PictureType) -> Self {
        match picture_type {
            PictureType::CoverFront => ArtworkType::CoverFront,
            PictureType::CoverBack => ArtworkType::CoverBack,
            PictureType::Artist
            | PictureType::Conductor
            | PictureType::LeadArtist
            | PictureType::Band => ArtworkType::Artist,
            _ => ArtworkType::Other,
        }
    }
}

/// Display values for a track, with placeholders for missing tags.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackTags {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: Option<i32>,
    /// 0 when unknown
    pub duration_ms: u64,
    pub cover: Option<ExtractedArtwork>,
}

impl TrackTags {
    /// Placeholder values used when a file has no readable tags.
    pub fn unknown() -> Self {
        Self {
            title: UNKNOWN_TITLE.to_string(),
            artist: UNKNOWN_ARTIST.to_string(),
            album: UNKNOWN_ALBUM.to_string(),
            year: None,
            duration_ms: 0,
            cover: None,
        }
    }
}

impl From<ExtractedMetadata> for TrackTags {
    fn from(metadata: ExtractedMetadata) -> Self {
        Self {
            title: metadata.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            artist: metadata.artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            album: metadata.album.unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
            year: metadata.year,
            duration_ms: metadata.duration_ms,
            cover: metadata.artwork.into_iter().next(),
        }
    }
}

/// Audio metadata extractor
#[derive(Debug, Clone, Copy)]
pub struct MetadataExtractor {
    parse_options: ParseOptions,
}

impl MetadataExtractor {
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::new(),
        }
    }

    pub fn with_options(parse_options: ParseOptions) -> Self {
        Self { parse_options }
    }

    /// Extract metadata from file contents.
    ///
    /// # Errors
    ///
    /// Fails when the format cannot be identified or its container cannot be
    /// parsed. A file that parses but carries no tags succeeds with `None`
    /// fields.
    pub fn extract(&self, data: &[u8]) -> Result<ExtractedMetadata> {
        let tagged_file = Probe::new(Cursor::new(data))
            .options(self.parse_options)
            .guess_file_type()?
            .read()
            .map_err(|e| MetadataError::ExtractionFailed(format!("Failed to parse file: {}", e)))?;

        let file_type = tagged_file.file_type();
        let properties = tagged_file.properties();

        let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());
        if tag.is_none() {
            debug!(?file_type, "File carries no tags");
        }

        let text = |value: Option<std::borrow::Cow<'_, str>>| {
            value
                .map(|s| normalize_text(&s))
                .filter(|s| !s.is_empty())
        };

        Ok(ExtractedMetadata {
            title: tag.and_then(|t| text(t.title())),
            artist: tag.and_then(|t| text(t.artist())),
            album: tag.and_then(|t| text(t.album())),
            year: tag.and_then(|t| t.year()).and_then(|y| i32::try_from(y).ok()),
            duration_ms: u64::try_from(properties.duration().as_millis()).unwrap_or(u64::MAX),
            bitrate: properties.audio_bitrate(),
            sample_rate: properties.sample_rate(),
            channels: properties.channels(),
            mime_type: file_type_to_mime_type(file_type).to_string(),
            artwork: tag.map(extract_artwork).unwrap_or_default(),
        })
    }

    /// Extract on a blocking thread, falling back to [`TrackTags::unknown`].
    pub async fn extract_or_default(&self, data: Bytes) -> TrackTags {
        let extractor = *self;
        match tokio::task::spawn_blocking(move || extractor.extract(&data)).await {
            Ok(Ok(metadata)) => TrackTags::from(metadata),
            Ok(Err(e)) => {
                warn!(error = %e, "Tag extraction failed, using placeholders");
                TrackTags::unknown()
            }
            Err(e) => {
                warn!(error = %e, "Tag extraction task failed, using placeholders");
                TrackTags::unknown()
            }
        }
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl From<lofty::error::LoftyError> for MetadataError {
    fn from(e: lofty::error::LoftyError) -> Self {
        MetadataError::UnsupportedFormat(e.to_string())
    }
}

/// Collapse whitespace runs and drop control characters
fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

/// Usable pictures with the front cover first
fn extract_artwork(tag: &Tag) -> Vec<ExtractedArtwork> {
    let mut artwork: Vec<ExtractedArtwork> = tag
        .pictures()
        .iter()
        .filter(|pic| !pic.data().is_empty())
        .filter_map(|pic| {
            let mime_type = pic.mime_type().and_then(mime_type_to_str)?;
            Some(ExtractedArtwork {
                data: Bytes::copy_from_slice(pic.data()),
                mime_type: mime_type.to_string(),
                picture_type: ArtworkType::from(pic.pic_type()),
            })
        })
        .collect();

    artwork.sort_by_key(|a| a.picture_type != ArtworkType::CoverFront);
    artwork
}

fn mime_type_to_str(mime_type: &MimeType) -> Option<&'static str> {
    match mime_type {
        MimeType::Png => Some("image/png"),
        MimeType::Jpeg => Some("image/jpeg"),
        MimeType::Tiff => Some("image/tiff"),
        MimeType::Bmp => Some("image/bmp"),
        MimeType::Gif => Some("image/gif"),
        _ => None,
    }
}

fn file_type_to_mime_type(file_type: FileType) -> &'static str {
    match file_type {
        FileType::Aac => "audio/aac",
        FileType::Aiff => "audio/aiff",
        FileType::Flac => "audio/flac",
        FileType::Mpeg => "audio/mpeg",
        FileType::Mp4 => "audio/mp4",
        FileType::Opus => "audio/opus",
        FileType::Vorbis => "audio/vorbis",
        FileType::Wav => "audio/wav",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Hello   World  "), "Hello World");
        assert_eq!(normalize_text("Title\nWith\tWhitespace"), "Title With Whitespace");
        assert_eq!(normalize_text("Bad\u{0}Byte"), "BadByte");
    }

    #[test]
    fn test_artwork_type_conversion() {
        assert_eq!(ArtworkType::from(PictureType::CoverFront), ArtworkType::CoverFront);
        assert_eq!(ArtworkType::from(PictureType::Band), ArtworkType::Artist);
        assert_eq!(ArtworkType::from(PictureType::Other), ArtworkType::Other);
    }

    #[test]
    fn test_artwork_extension_follows_mime_subtype() {
        let art = |mime: &str| ExtractedArtwork {
            data: Bytes::from_static(b"x"),
            mime_type: mime.to_string(),
            picture_type: ArtworkType::CoverFront,
        };
        assert_eq!(art("image/jpeg").file_extension(), "jpeg");
        assert_eq!(art("image/png").file_extension(), "png");
        assert_eq!(art("image/").file_extension(), "jpg");
        assert_eq!(art("weird").file_extension(), "jpg");
    }

    #[test]
    fn test_missing_tags_resolve_to_placeholders() {
        let tags = TrackTags::from(ExtractedMetadata {
            title: None,
            artist: Some("Band".to_string()),
            album: None,
            year: None,
            duration_ms: 1234,
            bitrate: None,
            sample_rate: None,
            channels: None,
            mime_type: "audio/mpeg".to_string(),
            artwork: Vec::new(),
        });
        assert_eq!(tags.title, UNKNOWN_TITLE);
        assert_eq!(tags.artist, "Band");
        assert_eq!(tags.album, UNKNOWN_ALBUM);
        assert_eq!(tags.duration_ms, 1234);
        assert!(tags.cover.is_none());
    }

    #[test]
    fn test_file_type_to_mime_type() {
        assert_eq!(file_type_to_mime_type(FileType::Mpeg), "audio/mpeg");
        assert_eq!(file_type_to_mime_type(FileType::Wav), "audio/wav");
    }
}
