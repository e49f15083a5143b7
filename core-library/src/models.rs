//! Domain models for the track library
//!
//! Rows map directly onto the tables in `migrations/`. Ids are stored as
//! text; [`TrackId`] and [`PlaylistId`] parse and generate them.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

// =============================================================================
// ID Types
// =============================================================================

/// Unique identifier for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub Uuid);

impl TrackId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaylistId(pub Uuid);

impl PlaylistId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for PlaylistId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Track
// =============================================================================

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// An uploaded, processed track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Track {
    pub id: String,
    /// Authenticated user that uploaded the track
    pub owner_id: String,
    /// Display name, from tags or the file name
    pub name: String,
    pub artist: String,
    pub album: String,
    pub year: Option<i32>,
    pub duration_ms: i64,
    /// Object key of the processed audio that is streamed
    pub storage_key: String,
    /// Object key of the upload as received
    pub original_key: String,
    pub cover_image_key: Option<String>,
    /// Size of the processed object in bytes
    pub file_size: i64,
    /// MIME type of the processed object
    pub content_type: String,
    /// Unix seconds
    pub uploaded_at: i64,
}

impl Track {
    /// New track with a fresh id and placeholder tag values.
    pub fn new(
        owner_id: impl Into<String>,
        name: impl Into<String>,
        storage_key: impl Into<String>,
        original_key: impl Into<String>,
    ) -> Self {
        Self {
            id: TrackId::new().to_string(),
            owner_id: owner_id.into(),
            name: name.into(),
            artist: UNKNOWN_ARTIST.to_string(),
            album: UNKNOWN_ALBUM.to_string(),
            year: None,
            duration_ms: 0,
            storage_key: storage_key.into(),
            original_key: original_key.into(),
            cover_image_key: None,
            file_size: 0,
            content_type: "audio/mpeg".to_string(),
            uploaded_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Validate track data
    pub fn validate(&self) -> Result<(), String> {
        if self.owner_id.trim().is_empty() {
            return Err("Owner id cannot be empty".to_string());
        }

        if self.name.trim().is_empty() {
            return Err("Track name cannot be empty".to_string());
        }

        if self.storage_key.is_empty() || self.original_key.is_empty() {
            return Err("Storage keys cannot be empty".to_string());
        }

        if self.duration_ms < 0 {
            return Err("Duration cannot be negative".to_string());
        }

        if self.file_size < 0 {
            return Err("File size cannot be negative".to_string());
        }

        if let Some(year) = self.year {
            if !(1000..=9999).contains(&year) {
                return Err(format!("Invalid year: {}", year));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Playlist
// =============================================================================

/// A user playlist
///
/// `track_count` is computed by the repository queries and ignored on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Playlist {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    /// Lower-cased, trimmed name for duplicate checks
    pub normalized_name: String,
    #[sqlx(default)]
    pub track_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Playlist {
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into().trim().to_string();
        let now = chrono::Utc::now().timestamp();
        Self {
            id: PlaylistId::new().to_string(),
            owner_id: owner_id.into(),
            normalized_name: name.to_lowercase(),
            name,
            track_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate playlist data
    pub fn validate(&self) -> Result<(), String> {
        if self.owner_id.trim().is_empty() {
            return Err("Owner id cannot be empty".to_string());
        }

        if self.name.trim().is_empty() {
            return Err("Playlist name cannot be empty".to_string());
        }

        if self.name.chars().count() > 200 {
            return Err("Playlist name cannot exceed 200 characters".to_string());
        }

        Ok(())
    }
}
