//! # Host Bridge Traits
//!
//! Abstraction traits for the external collaborators the service depends on.
//!
//! ## Overview
//!
//! This crate defines the contract between the core crates and the concrete
//! backends wired in at startup. Each trait represents a capability that the
//! core requires but that is provided differently per deployment (local disk
//! vs. object bucket, real network vs. test double).
//!
//! ## Traits
//!
//! ### Storage & Networking
//! - [`ObjectStore`](storage::ObjectStore) - Keyed object storage with ranged reads
//! - [`HttpClient`](http::HttpClient) - Async HTTP GET with streamed bodies
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Implementations
//!
//! | Backend | Implementation Crate |
//! |---------|---------------------|
//! | Local disk object store | `bridge-desktop` |
//! | In-memory object store  | `bridge-desktop` |
//! | reqwest HTTP client     | `bridge-desktop` |
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type for consistent
//! error handling. Implementations should:
//!
//! - Convert backend-specific errors to `BridgeError`
//! - Report missing objects as `BridgeError::NotFound` so callers can answer 404
//! - Include error context (e.g., object keys, URLs)
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so that a single instance can
//! be shared across request handlers behind an `Arc`.
//!
//! ## Examples
//!
//! ### Implementing ObjectStore
//!
//! ```ignore
//! use bridge_traits::storage::{ByteStream, ObjectMetadata, ObjectStore};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct BucketStore {
//!     client: MyBucketClient,
//! }
//!
//! #[async_trait]
//! impl ObjectStore for BucketStore {
//!     async fn get_range(&self, key: &str, start: u64, end: u64) -> Result<ByteStream> {
//!         // Issue a ranged GET against the bucket
//!         todo!()
//!     }
//!     // ...
//! }
//! ```

pub mod error;
pub mod http;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpRequest, HttpStream};
pub use storage::{ByteStream, ObjectMetadata, ObjectStore};
pub use time::{Clock, FixedClock, LogLevel, SystemClock};
