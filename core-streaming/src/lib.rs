//! # Audio Streaming
//!
//! Byte-range delivery of stored audio and relay of upstream radio feeds.
//!
//! ## Overview
//!
//! - [`serve`] answers a request for a [`StreamableResource`], honouring an
//!   optional `Range` header. Bodies are streamed from
//!   [`ObjectStore::get_range`](bridge_traits::storage::ObjectStore::get_range)
//!   and never buffered whole.
//! - [`FeedFetcher`] opens a live stream from the first answering source of a
//!   primary/fallback chain.
//!
//! ## Range policy
//!
//! | Header | Result |
//! |--------|--------|
//! | absent | 200, whole resource |
//! | `bytes=S-E`, `bytes=S-` | 206, `E` clamped to the last byte |
//! | `bytes=-N` | 206, last `N` bytes |
//! | anything else | 416 with `Content-Range: bytes */size` |

pub mod error;
pub mod feed;
pub mod range;
pub mod resource;
pub mod server;

pub use error::{Result, StreamError};
pub use feed::{FeedConfig, FeedFetcher, FeedStream};
pub use range::{parse_range, RangeSpec};
pub use resource::StreamableResource;
pub use server::{serve, TRACK_NAME_HEADER};
