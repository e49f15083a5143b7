//! # Repositories
//!
//! Repository traits and their SQLite implementations.
//!
//! - Traits define the data access interface used by the service layer
//! - `Sqlite*` implementations use sqlx against the shared pool
//! - Listing queries return [`Page<T>`] where the route is paged
//!
//! ## Available Repositories
//!
//! - `TrackRepository` - uploaded tracks, scoped by owner
//! - `PlaylistRepository` - user playlists and their ordered tracks

pub mod pagination;
pub mod playlist;
pub mod track;

pub use pagination::{Page, PageRequest, MAX_PAGE_SIZE};
pub use playlist::{PlaylistRepository, SqlitePlaylistRepository};
pub use track::{SqliteTrackRepository, TrackRepository};
