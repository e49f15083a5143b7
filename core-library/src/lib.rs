//! # Track Library
//!
//! Relational metadata store for uploaded tracks and user playlists.
//!
//! ## Overview
//!
//! This crate manages:
//! - SQLite connection pooling and embedded migrations ([`db`])
//! - Domain models with validation ([`models`])
//! - Repository traits with SQLite implementations ([`repositories`])
//!
//! Every query is scoped by owner where a user-facing route needs it, so a
//! track id alone never exposes another user's audio.

pub mod db;
pub mod error;
pub mod models;
pub mod repositories;

pub use db::{create_pool, create_test_pool, DatabaseConfig};
pub use error::{LibraryError, Result};
pub use models::{Playlist, PlaylistId, Track, TrackId};
pub use repositories::{
    Page, PageRequest, PlaylistRepository, SqlitePlaylistRepository, SqliteTrackRepository,
    TrackRepository,
};
