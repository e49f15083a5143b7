//! Tag extraction over real files written to a scratch directory

use bytes::Bytes;
use core_metadata::{ArtworkType, MetadataExtractor, TrackTags};
use lofty::config::WriteOptions;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::tag::{Accessor, Tag, TagExt, TagType};
use std::path::Path;
use tempfile::TempDir;

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3, 4];

/// One second of 8 kHz mono silence
fn write_wav(path: &Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for _ in 0..8_000 {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn test_untagged_wav_has_duration_only() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plain.wav");
    write_wav(&path);

    let metadata = MetadataExtractor::new()
        .extract(&std::fs::read(&path).unwrap())
        .unwrap();

    assert_eq!(metadata.title, None);
    assert_eq!(metadata.artist, None);
    assert_eq!(metadata.mime_type, "audio/wav");
    assert_eq!(metadata.sample_rate, Some(8_000));
    assert_eq!(metadata.channels, Some(1));
    assert!((990..=1010).contains(&metadata.duration_ms));
    assert!(metadata.artwork.is_empty());
}

#[test]
fn test_tagged_wav_reports_tags_and_cover() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tagged.wav");
    write_wav(&path);

    let mut tag = Tag::new(TagType::Id3v2);
    tag.set_title("  Morning   Light ".to_string());
    tag.set_artist("The Tuners".to_string());
    tag.set_album("Four Three Two".to_string());
    tag.set_year(2003);
    tag.push_picture(Picture::new_unchecked(
        PictureType::CoverFront,
        Some(MimeType::Png),
        None,
        PNG_BYTES.to_vec(),
    ));
    tag.save_to_path(&path, WriteOptions::default()).unwrap();

    let metadata = MetadataExtractor::new()
        .extract(&std::fs::read(&path).unwrap())
        .unwrap();

    assert_eq!(metadata.title.as_deref(), Some("Morning Light"));
    assert_eq!(metadata.artist.as_deref(), Some("The Tuners"));
    assert_eq!(metadata.album.as_deref(), Some("Four Three Two"));
    assert_eq!(metadata.year, Some(2003));

    let tags = TrackTags::from(metadata);
    let cover = tags.cover.expect("cover art");
    assert_eq!(cover.picture_type, ArtworkType::CoverFront);
    assert_eq!(cover.mime_type, "image/png");
    assert_eq!(cover.file_extension(), "png");
    assert_eq!(cover.data.as_ref(), PNG_BYTES);
}

#[test]
fn test_garbage_is_rejected() {
    assert!(MetadataExtractor::new().extract(&[0u8; 64]).is_err());
    assert!(MetadataExtractor::new().extract(&[]).is_err());
}

#[tokio::test]
async fn test_extract_or_default_falls_back_to_placeholders() {
    let tags = MetadataExtractor::new()
        .extract_or_default(Bytes::from_static(b"definitely not audio"))
        .await;

    assert_eq!(tags, TrackTags::unknown());
    assert_eq!(tags.title, "Unknown Title");
    assert_eq!(tags.artist, "Unknown Artist");
    assert_eq!(tags.album, "Unknown Album");
    assert_eq!(tags.duration_ms, 0);
}

#[tokio::test]
async fn test_extract_or_default_keeps_duration_for_untagged_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plain.wav");
    write_wav(&path);

    let tags = MetadataExtractor::new()
        .extract_or_default(Bytes::from(std::fs::read(&path).unwrap()))
        .await;

    assert_eq!(tags.title, "Unknown Title");
    assert!(tags.duration_ms > 900);
}
