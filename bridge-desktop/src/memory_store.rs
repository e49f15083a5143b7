//! In-memory object store for tests and development

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{check_range, validate_key, ByteStream, ObjectMetadata, ObjectStore},
};
use bytes::Bytes;
use futures_util::stream;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

const CHUNK_SIZE: usize = 16 * 1024;

#[derive(Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
}

/// Object store backed by a `HashMap`
///
/// Ranged reads are served as a stream of fixed-size chunks that share the
/// stored buffer, mirroring how a disk or network backend delivers data.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorted list of stored keys
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    async fn lookup(&self, key: &str) -> Result<StoredObject> {
        validate_key(key)?;
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| BridgeError::NotFound(key.to_string()))
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, key: &str) -> Result<Bytes> {
        Ok(self.lookup(key).await?.data)
    }

    async fn get_range(&self, key: &str, start: u64, end: u64) -> Result<ByteStream> {
        let object = self.lookup(key).await?;
        check_range(key, start, end, object.data.len() as u64)?;

        let range = object.data.slice(start as usize..=end as usize);
        let chunks: Vec<std::io::Result<Bytes>> = (0..range.len())
            .step_by(CHUNK_SIZE)
            .map(|offset| Ok(range.slice(offset..(offset + CHUNK_SIZE).min(range.len()))))
            .collect();

        debug!(key, start, end, chunks = chunks.len(), "Opened in-memory ranged read");
        Ok(Box::pin(stream::iter(chunks)))
    }

    async fn head(&self, key: &str) -> Result<ObjectMetadata> {
        let object = self.lookup(key).await?;
        Ok(ObjectMetadata {
            content_length: object.data.len() as u64,
            content_type: Some(object.content_type),
        })
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        validate_key(key)?;
        debug!(key, size = data.len(), content_type, "Stored in-memory object");
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }
}
