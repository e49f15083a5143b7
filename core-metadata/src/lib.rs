//! # Track Metadata
//!
//! Reads tags and audio properties from uploaded files.
//!
//! ## Overview
//!
//! - Tag extraction (ID3, RIFF INFO, Vorbis, MP4) through `lofty`
//! - Embedded cover art selection
//! - Resolution to display values, where missing tags become
//!   `Unknown Title`, `Unknown Artist` and `Unknown Album`

pub mod error;
pub mod extractor;

pub use error::{MetadataError, Result};
pub use extractor::{ArtworkType, ExtractedArtwork, ExtractedMetadata, MetadataExtractor, TrackTags};
