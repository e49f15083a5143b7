//! Track repository trait and implementation

use crate::error::{LibraryError, Result};
use crate::models::Track;
use crate::repositories::{Page, PageRequest};
use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar, SqlitePool};
use tracing::debug;

/// Track repository interface for data access operations
#[async_trait]
pub trait TrackRepository: Send + Sync {
    /// Find a track by its ID regardless of owner
    async fn find_by_id(&self, id: &str) -> Result<Option<Track>>;

    /// Find a track only if it belongs to `owner_id`
    async fn find_for_owner(&self, id: &str, owner_id: &str) -> Result<Option<Track>>;

    /// Insert a new track
    ///
    /// # Errors
    /// Returns error if validation fails or the id already exists.
    async fn insert(&self, track: &Track) -> Result<()>;

    /// Delete an owner's track
    ///
    /// # Returns
    /// - `Ok(true)` if the track was deleted
    /// - `Ok(false)` if no such track belongs to the owner
    async fn delete(&self, id: &str, owner_id: &str) -> Result<bool>;

    /// Owner's tracks, newest upload first
    async fn query_by_owner(&self, owner_id: &str, page_request: PageRequest)
        -> Result<Page<Track>>;

    async fn count_by_owner(&self, owner_id: &str) -> Result<i64>;
}

/// SQLite implementation of TrackRepository
pub struct SqliteTrackRepository {
    pool: SqlitePool,
}

impl SqliteTrackRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrackRepository for SqliteTrackRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Track>> {
        let track = query_as::<_, Track>("SELECT * FROM tracks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(track)
    }

    async fn find_for_owner(&self, id: &str, owner_id: &str) -> Result<Option<Track>> {
        let track = query_as::<_, Track>("SELECT * FROM tracks WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(track)
    }

    async fn insert(&self, track: &Track) -> Result<()> {
        track
            .validate()
            .map_err(|msg| LibraryError::invalid("track", msg))?;

        query(
            r#"
            INSERT INTO tracks (
                id, owner_id, name, artist, album, year, duration_ms,
                storage_key, original_key, cover_image_key,
                file_size, content_type, uploaded_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&track.id)
        .bind(&track.owner_id)
        .bind(&track.name)
        .bind(&track.artist)
        .bind(&track.album)
        .bind(track.year)
        .bind(track.duration_ms)
        .bind(&track.storage_key)
        .bind(&track.original_key)
        .bind(&track.cover_image_key)
        .bind(track.file_size)
        .bind(&track.content_type)
        .bind(track.uploaded_at)
        .execute(&self.pool)
        .await?;

        debug!(track_id = %track.id, "Inserted track");
        Ok(())
    }

    async fn delete(&self, id: &str, owner_id: &str) -> Result<bool> {
        let result = query("DELETE FROM tracks WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn query_by_owner(
        &self,
        owner_id: &str,
        page_request: PageRequest,
    ) -> Result<Page<Track>> {
        let total = self.count_by_owner(owner_id).await?;

        let tracks = query_as::<_, Track>(
            r#"
            SELECT * FROM tracks
            WHERE owner_id = ?
            ORDER BY uploaded_at DESC, id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(owner_id)
        .bind(page_request.limit())
        .bind(page_request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(tracks, total as u64, page_request))
    }

    async fn count_by_owner(&self, owner_id: &str) -> Result<i64> {
        let count = query_scalar::<_, i64>("SELECT COUNT(*) FROM tracks WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
