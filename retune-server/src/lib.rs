//! # Retune HTTP server
//!
//! Axum front end over [`core_service::CoreService`]:
//!
//! | Method | Path | |
//! |--------|------|---|
//! | GET | `/stream/:track_id` | processed audio, honours `Range` |
//! | GET | `/get-audio/:track_id` | same bytes as an attachment |
//! | GET | `/user-tracks/:page` | owner's tracks, 0-indexed pages |
//! | GET, POST | `/user-playlists` | list or create playlists |
//! | GET, POST | `/user-playlists/:id/tracks` | playlist contents |
//! | DELETE | `/user-playlists/:id/tracks/:track_id` | remove from playlist |
//! | POST | `/upload-audio` | raw audio body, `X-File-Name` header |
//! | GET | `/radio` | upstream feed relay |
//! | GET | `/health` | liveness |
//!
//! Owner-scoped routes read the caller from the `X-Owner-Id` header.

pub mod error;
pub mod owner;
pub mod routes;

pub use error::ApiError;
pub use owner::{Owner, OWNER_HEADER};
pub use routes::{router, FILE_NAME_HEADER};
