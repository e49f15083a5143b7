use bridge_traits::storage::ObjectStore;

use crate::error::Result;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A stored object that can be served by byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamableResource {
    /// Object store key
    pub key: String,
    /// Total size in bytes
    pub size: u64,
    pub content_type: String,
    /// Human-readable name sent in the track name header
    pub display_name: String,
}

impl StreamableResource {
    pub fn new(
        key: impl Into<String>,
        size: u64,
        content_type: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            size,
            content_type: content_type.into(),
            display_name: display_name.into(),
        }
    }

    /// Describe an object from its stored metadata.
    ///
    /// The size always comes from the store, so a stale database row cannot
    /// produce a wrong `Content-Length`.
    pub async fn from_store(
        store: &dyn ObjectStore,
        key: &str,
        display_name: impl Into<String>,
    ) -> Result<Self> {
        let metadata = store.head(key).await?;
        Ok(Self {
            key: key.to_string(),
            size: metadata.content_length,
            content_type: metadata
                .content_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            display_name: display_name.into(),
        })
    }
}
