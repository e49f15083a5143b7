//! Upload pipeline
//!
//! Turns a received file into a stored, retuned track:
//!
//! ```text
//! validate ─▶ store original ─▶ read tags ─▶ store cover
//!          ─▶ decode ─▶ shift ─▶ encode ─▶ store processed ─▶ insert track
//! ```
//!
//! Objects are keyed `{owner}/original/{id}-{file}`,
//! `{owner}/covers/{id}-{stem}.{ext}` and `{owner}/processed/{id}-{stem}.{ext}`
//! where `id` is the new track's id, so a stored object is never rewritten by
//! a later upload. Tag extraction falls back to placeholder values; codec
//! failures fail the upload.

use bytes::Bytes;
use core_audio::AudioError;
use core_library::{Track, TrackId};
use core_runtime::logging::{redact_if_sensitive, strip_path};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::{CoreError, Result};
use crate::CoreService;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
const MAX_FILE_NAME_CHARS: usize = 200;

/// Limits applied to every upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_bytes: usize,
    /// Accepted request content types, compared without parameters
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_content_types: vec!["audio/mpeg".to_string(), "audio/mp3".to_string()],
        }
    }
}

impl UploadPolicy {
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn allow_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.allowed_content_types.push(content_type.into());
        self
    }

    fn accepts(&self, content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        self.allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(essence))
    }
}

/// A received upload
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub owner_id: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Result of a completed upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadReceipt {
    pub track: Track,
    pub original_key: String,
    pub processed_key: String,
    pub cover_key: Option<String>,
}

/// Reduce a client-supplied file name to a safe single key segment.
///
/// Directory components are dropped, characters outside
/// `[A-Za-z0-9 ._-]` become `_`, and leading dots are removed.
pub fn sanitize_file_name(raw: &str) -> Result<String> {
    let base = strip_path(raw.trim());
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, ' ' | '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').trim();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_' || c == '.') {
        return Err(CoreError::InvalidUpload(format!(
            "file name '{}' has no usable characters",
            raw
        )));
    }

    Ok(cleaned.chars().take(MAX_FILE_NAME_CHARS).collect())
}

/// File name without its last extension
fn file_stem(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

fn validate_owner(owner_id: &str) -> Result<()> {
    if owner_id.trim().is_empty() {
        return Err(CoreError::Unauthorized("missing owner id".to_string()));
    }
    bridge_traits::storage::validate_key(owner_id)
        .ok()
        .filter(|_| !owner_id.contains('/'))
        .ok_or_else(|| CoreError::Unauthorized("owner id is not a valid key segment".to_string()))
}

impl CoreService {
    /// Run the full upload pipeline and record the new track.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` for a missing or unusable owner id
    /// - `InvalidUpload` for an empty, oversized or wrongly typed body
    /// - `Audio` when the file cannot be decoded or encoded
    /// - `Storage` / `Library` for backend failures
    #[instrument(
        skip(self, request),
        fields(
            owner = %redact_if_sensitive("owner_id", &request.owner_id),
            size = request.data.len()
        )
    )]
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadReceipt> {
        let deps = &self.deps;
        let policy = &deps.upload_policy;

        validate_owner(&request.owner_id)?;
        if request.data.is_empty() {
            return Err(CoreError::InvalidUpload("request body is empty".to_string()));
        }
        if request.data.len() > policy.max_bytes {
            return Err(CoreError::InvalidUpload(format!(
                "upload of {} bytes exceeds the {} byte limit",
                request.data.len(),
                policy.max_bytes
            )));
        }
        if !policy.accepts(&request.content_type) {
            return Err(CoreError::InvalidUpload(format!(
                "content type '{}' is not accepted",
                request.content_type
            )));
        }

        let file_name = sanitize_file_name(&request.file_name)?;
        let stem = file_stem(&file_name);
        let owner = request.owner_id.as_str();
        let track_id = TrackId::new().to_string();

        let original_key = format!("{}/original/{}-{}", owner, track_id, file_name);
        deps.object_store
            .put(&original_key, request.data.clone(), &request.content_type)
            .await?;
        debug!(key = %original_key, "Stored original");

        let tags = deps.metadata.extract_or_default(request.data.clone()).await;

        let cover_key = match &tags.cover {
            Some(cover) => {
                let key = format!(
                    "{}/covers/{}-{}.{}",
                    owner,
                    track_id,
                    stem,
                    cover.file_extension()
                );
                deps.object_store
                    .put(&key, cover.data.clone(), &cover.mime_type)
                    .await?;
                debug!(key = %key, "Stored cover image");
                Some(key)
            }
            None => None,
        };

        let decoded = deps.codec.decode(request.data).await?;
        let decoded_ms = (decoded.duration().as_secs_f64() * 1000.0).round() as i64;

        let shifter = deps.shifter;
        let shifted = tokio::task::spawn_blocking(move || shifter.shift(&decoded))
            .await
            .map_err(|e| AudioError::Internal(format!("shift task failed: {}", e)))?;

        let encoded = deps.codec.encode(&shifted).await?;

        let processed_key = format!(
            "{}/processed/{}-{}.{}",
            owner, track_id, stem, encoded.extension
        );
        deps.object_store
            .put(&processed_key, encoded.data.clone(), &encoded.content_type)
            .await?;

        let mut track = Track::new(owner, tags.title, processed_key.clone(), original_key.clone());
        track.id = track_id;
        track.artist = tags.artist;
        track.album = tags.album;
        track.year = tags.year.filter(|y| (1000..=9999).contains(y));
        track.duration_ms = match i64::try_from(tags.duration_ms) {
            Ok(ms) if ms > 0 => ms,
            _ => decoded_ms,
        };
        track.cover_image_key = cover_key.clone();
        track.file_size = encoded.data.len() as i64;
        track.content_type = encoded.content_type;
        track.uploaded_at = deps.clock.unix_timestamp();

        deps.tracks.insert(&track).await?;

        info!(
            track_id = %track.id,
            file = %file_name,
            duration_ms = track.duration_ms,
            processed_bytes = track.file_size,
            "Upload processed"
        );

        Ok(UploadReceipt {
            track,
            original_key,
            processed_key,
            cover_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("song.mp3").unwrap(), "song.mp3");
        assert_eq!(sanitize_file_name("My Song (live).mp3").unwrap(), "My Song _live_.mp3");
        assert_eq!(sanitize_file_name("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_file_name("C:\\music\\track.mp3").unwrap(), "track.mp3");
        assert_eq!(sanitize_file_name(".hidden.mp3").unwrap(), "hidden.mp3");
        assert_eq!(sanitize_file_name("Öl.mp3").unwrap(), "_l.mp3");
    }

    #[test]
    fn test_sanitize_rejects_empty_names() {
        assert!(sanitize_file_name("").is_err());
        assert!(sanitize_file_name("   ").is_err());
        assert!(sanitize_file_name("..").is_err());
        assert!(sanitize_file_name("dir/").is_err());
        assert!(sanitize_file_name("???").is_err());
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = format!("{}.mp3", "a".repeat(500));
        assert_eq!(sanitize_file_name(&long).unwrap().len(), MAX_FILE_NAME_CHARS);
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("song.mp3"), "song");
        assert_eq!(file_stem("a.b.mp3"), "a.b");
        assert_eq!(file_stem("noext"), "noext");
    }

    #[test]
    fn test_policy_accepts_content_types() {
        let policy = UploadPolicy::default();
        assert!(policy.accepts("audio/mpeg"));
        assert!(policy.accepts("Audio/MPEG; charset=binary"));
        assert!(!policy.accepts("audio/wav"));
        assert!(policy.clone().allow_content_type("audio/wav").accepts("audio/wav"));
    }

    #[test]
    fn test_validate_owner() {
        assert!(validate_owner("user-1").is_ok());
        assert!(matches!(validate_owner(""), Err(CoreError::Unauthorized(_))));
        assert!(validate_owner("a/b").is_err());
        assert!(validate_owner("..").is_err());
    }
}
