//! Playlist repository trait and implementation

use crate::error::{LibraryError, Result};
use crate::models::{Playlist, Track};
use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar, SqlitePool};
use tracing::debug;

const PLAYLIST_COLUMNS: &str = r#"
    p.id, p.owner_id, p.name, p.normalized_name, p.created_at, p.updated_at,
    (SELECT COUNT(*) FROM playlist_tracks pt WHERE pt.playlist_id = p.id) AS track_count
"#;

/// Playlist repository interface for data access operations
#[async_trait]
pub trait PlaylistRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Playlist>>;

    /// Find a playlist only if it belongs to `owner_id`
    async fn find_for_owner(&self, id: &str, owner_id: &str) -> Result<Option<Playlist>>;

    /// Insert a new playlist
    ///
    /// # Errors
    /// Returns `InvalidInput` if validation fails or the owner already has a
    /// playlist with the same normalized name.
    async fn insert(&self, playlist: &Playlist) -> Result<()>;

    /// Owner's playlists, oldest first
    async fn query_by_owner(&self, owner_id: &str) -> Result<Vec<Playlist>>;

    /// Append a track to the end of a playlist
    ///
    /// # Returns
    /// The 0-based position the track was stored at.
    ///
    /// # Errors
    /// - `NotFound` if the playlist or track does not exist
    /// - `InvalidInput` if the track is already in the playlist
    async fn add_track(&self, playlist_id: &str, track_id: &str) -> Result<i64>;

    /// Remove a track and close the gap in positions
    async fn remove_track(&self, playlist_id: &str, track_id: &str) -> Result<bool>;

    /// Tracks in playlist order
    async fn get_tracks(&self, playlist_id: &str) -> Result<Vec<Track>>;
}

/// SQLite implementation of PlaylistRepository
pub struct SqlitePlaylistRepository {
    pool: SqlitePool,
}

impl SqlitePlaylistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaylistRepository for SqlitePlaylistRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Playlist>> {
        let sql = format!("SELECT {} FROM playlists p WHERE p.id = ?", PLAYLIST_COLUMNS);
        let playlist = query_as::<_, Playlist>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(playlist)
    }

    async fn find_for_owner(&self, id: &str, owner_id: &str) -> Result<Option<Playlist>> {
        let sql = format!(
            "SELECT {} FROM playlists p WHERE p.id = ? AND p.owner_id = ?",
            PLAYLIST_COLUMNS
        );
        let playlist = query_as::<_, Playlist>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(playlist)
    }

    async fn insert(&self, playlist: &Playlist) -> Result<()> {
        playlist
            .validate()
            .map_err(|e| LibraryError::invalid("playlist", e))?;

        let existing = query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM playlists WHERE owner_id = ? AND normalized_name = ?",
        )
        .bind(&playlist.owner_id)
        .bind(&playlist.normalized_name)
        .fetch_one(&self.pool)
        .await?;
        if existing > 0 {
            return Err(LibraryError::invalid(
                "name",
                format!("a playlist named '{}' already exists", playlist.name),
            ));
        }

        query(
            r#"
            INSERT INTO playlists (id, owner_id, name, normalized_name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&playlist.id)
        .bind(&playlist.owner_id)
        .bind(&playlist.name)
        .bind(&playlist.normalized_name)
        .bind(playlist.created_at)
        .bind(playlist.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(playlist_id = %playlist.id, "Inserted playlist");
        Ok(())
    }

    async fn query_by_owner(&self, owner_id: &str) -> Result<Vec<Playlist>> {
        let sql = format!(
            "SELECT {} FROM playlists p WHERE p.owner_id = ? ORDER BY p.created_at, p.name",
            PLAYLIST_COLUMNS
        );
        let playlists = query_as::<_, Playlist>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(playlists)
    }

    async fn add_track(&self, playlist_id: &str, track_id: &str) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let playlist_exists = query_scalar::<_, i64>("SELECT COUNT(*) FROM playlists WHERE id = ?")
            .bind(playlist_id)
            .fetch_one(&mut *tx)
            .await?;
        if playlist_exists == 0 {
            return Err(LibraryError::not_found("playlist", playlist_id));
        }

        let track_exists = query_scalar::<_, i64>("SELECT COUNT(*) FROM tracks WHERE id = ?")
            .bind(track_id)
            .fetch_one(&mut *tx)
            .await?;
        if track_exists == 0 {
            return Err(LibraryError::not_found("track", track_id));
        }

        let already = query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM playlist_tracks WHERE playlist_id = ? AND track_id = ?",
        )
        .bind(playlist_id)
        .bind(track_id)
        .fetch_one(&mut *tx)
        .await?;
        if already > 0 {
            return Err(LibraryError::invalid(
                "track_id",
                "track is already in the playlist",
            ));
        }

        let position = query_scalar::<_, i64>(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM playlist_tracks WHERE playlist_id = ?",
        )
        .bind(playlist_id)
        .fetch_one(&mut *tx)
        .await?;

        let now = chrono::Utc::now().timestamp();
        query(
            "INSERT INTO playlist_tracks (playlist_id, track_id, position, added_at) VALUES (?, ?, ?, ?)",
        )
        .bind(playlist_id)
        .bind(track_id)
        .bind(position)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        query("UPDATE playlists SET updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(playlist_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(playlist_id, track_id, position, "Added track to playlist");
        Ok(position)
    }

    async fn remove_track(&self, playlist_id: &str, track_id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let position = query_scalar::<_, i64>(
            "SELECT position FROM playlist_tracks WHERE playlist_id = ? AND track_id = ?",
        )
        .bind(playlist_id)
        .bind(track_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(position) = position else {
            return Ok(false);
        };

        query("DELETE FROM playlist_tracks WHERE playlist_id = ? AND track_id = ?")
            .bind(playlist_id)
            .bind(track_id)
            .execute(&mut *tx)
            .await?;

        // Shift in ascending order so the (playlist_id, position) key never collides.
        let later: Vec<i64> = query_scalar(
            "SELECT position FROM playlist_tracks WHERE playlist_id = ? AND position > ? ORDER BY position",
        )
        .bind(playlist_id)
        .bind(position)
        .fetch_all(&mut *tx)
        .await?;
        for old in later {
            query("UPDATE playlist_tracks SET position = ? WHERE playlist_id = ? AND position = ?")
                .bind(old - 1)
                .bind(playlist_id)
                .bind(old)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn get_tracks(&self, playlist_id: &str) -> Result<Vec<Track>> {
        let tracks = query_as::<_, Track>(
            r#"
            SELECT t.* FROM tracks t
            JOIN playlist_tracks pt ON pt.track_id = t.id
            WHERE pt.playlist_id = ?
            ORDER BY pt.position
            "#,
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tracks)
    }
}
