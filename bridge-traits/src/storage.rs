//! Object Storage Abstractions
//!
//! Provides a platform-agnostic trait for the keyed byte store that holds
//! uploaded originals, processed renditions and cover art.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

use crate::error::{BridgeError, Result};

/// Boxed stream of byte chunks read from a storage backend.
///
/// Dropping the stream releases the underlying file handle or connection.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

/// Object metadata returned by [`ObjectStore::head`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// Total size of the object in bytes
    pub content_length: u64,
    /// MIME type recorded when the object was stored
    pub content_type: Option<String>,
}

/// Keyed object storage trait
///
/// Abstracts the storage backend holding audio objects:
/// - Desktop/server: a directory on local disk
/// - Tests: an in-memory map
/// - Cloud deployments: an S3-compatible bucket
///
/// Keys are `/`-separated relative paths such as
/// `"{owner}/processed/song.mp3"`. See [`validate_key`].
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::ObjectStore;
///
/// async fn first_kilobyte(store: &dyn ObjectStore, key: &str) -> Result<ByteStream> {
///     let meta = store.head(key).await?;
///     let end = meta.content_length.min(1024).saturating_sub(1);
///     store.get_range(key, 0, end).await
/// }
/// ```
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read an entire object into memory
    ///
    /// For streaming delivery use `get_range` instead.
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Open a stream over the inclusive byte range `[start, end]` of an object
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::NotFound` if the key does not exist and
    /// `BridgeError::OperationFailed` if the range lies outside the object.
    /// Read failures after the stream is returned are yielded as `Err` items.
    async fn get_range(&self, key: &str, start: u64, end: u64) -> Result<ByteStream>;

    /// Fetch object metadata without reading its contents
    async fn head(&self, key: &str) -> Result<ObjectMetadata>;

    /// Store an object, replacing any previous object under the same key
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;

    /// Check whether an object exists
    async fn exists(&self, key: &str) -> Result<bool> {
        match self.head(key).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Validate an object key.
///
/// Keys must be non-empty relative paths without `.`/`..` segments, empty
/// segments or backslashes, so that they map safely onto a filesystem root.
pub fn validate_key(key: &str) -> Result<()> {
    let invalid = |reason: &str| BridgeError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if key.is_empty() {
        return Err(invalid("key is empty"));
    }
    if key.starts_with('/') {
        return Err(invalid("key must be relative"));
    }
    if key.contains('\\') || key.contains('\0') {
        return Err(invalid("key contains a forbidden character"));
    }
    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(invalid("key contains an empty or relative segment"));
    }

    Ok(())
}

/// Check that `[start, end]` is a valid inclusive range of an object of `size` bytes.
pub fn check_range(key: &str, start: u64, end: u64, size: u64) -> Result<()> {
    if start > end || end >= size {
        return Err(BridgeError::OperationFailed(format!(
            "range {}-{} outside object '{}' of {} bytes",
            start, end, key, size
        )));
    }
    Ok(())
}
