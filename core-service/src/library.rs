//! Owner-scoped library queries
//!
//! Every lookup is filtered by the caller's owner id. A row owned by someone
//! else is reported as not found.

use core_library::{Page, PageRequest, Playlist, Track};
use tracing::{debug, instrument};

use crate::error::{CoreError, Result};
use crate::CoreService;

impl CoreService {
    /// Owner's tracks, newest upload first.
    #[instrument(skip(self))]
    pub async fn list_tracks(&self, owner_id: &str, page: PageRequest) -> Result<Page<Track>> {
        Ok(self.deps.tracks.query_by_owner(owner_id, page).await?)
    }

    /// A single track, only if it belongs to `owner_id`.
    pub async fn get_track(&self, owner_id: &str, track_id: &str) -> Result<Track> {
        self.deps
            .tracks
            .find_for_owner(track_id, owner_id)
            .await?
            .ok_or_else(|| CoreError::not_found("track", track_id))
    }

    pub async fn list_playlists(&self, owner_id: &str) -> Result<Vec<Playlist>> {
        Ok(self.deps.playlists.query_by_owner(owner_id).await?)
    }

    /// Create an empty playlist.
    ///
    /// Names are trimmed; a duplicate of an existing name (ignoring case) is
    /// rejected as invalid input.
    #[instrument(skip(self))]
    pub async fn create_playlist(&self, owner_id: &str, name: &str) -> Result<Playlist> {
        let mut playlist = Playlist::new(owner_id, name);
        let now = self.deps.clock.unix_timestamp();
        playlist.created_at = now;
        playlist.updated_at = now;

        self.deps.playlists.insert(&playlist).await?;
        debug!(playlist_id = %playlist.id, "Created playlist");
        Ok(playlist)
    }

    /// Append one of the owner's tracks to one of the owner's playlists.
    ///
    /// Returns the position the track was stored at.
    #[instrument(skip(self))]
    pub async fn add_track_to_playlist(
        &self,
        owner_id: &str,
        playlist_id: &str,
        track_id: &str,
    ) -> Result<i64> {
        self.owned_playlist(owner_id, playlist_id).await?;
        self.get_track(owner_id, track_id).await?;
        Ok(self.deps.playlists.add_track(playlist_id, track_id).await?)
    }

    /// Remove a track from one of the owner's playlists.
    ///
    /// Returns `false` if the track was not in the playlist.
    pub async fn remove_track_from_playlist(
        &self,
        owner_id: &str,
        playlist_id: &str,
        track_id: &str,
    ) -> Result<bool> {
        self.owned_playlist(owner_id, playlist_id).await?;
        Ok(self.deps.playlists.remove_track(playlist_id, track_id).await?)
    }

    /// Tracks of one of the owner's playlists, in playlist order.
    pub async fn playlist_tracks(&self, owner_id: &str, playlist_id: &str) -> Result<Vec<Track>> {
        self.owned_playlist(owner_id, playlist_id).await?;
        Ok(self.deps.playlists.get_tracks(playlist_id).await?)
    }

    async fn owned_playlist(&self, owner_id: &str, playlist_id: &str) -> Result<Playlist> {
        self.deps
            .playlists
            .find_for_owner(playlist_id, owner_id)
            .await?
            .ok_or_else(|| CoreError::not_found("playlist", playlist_id))
    }
}
