//! Object Store Implementation using Tokio file I/O

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{check_range, validate_key, ByteStream, ObjectMetadata, ObjectStore},
};
use bytes::Bytes;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};
use tokio_util::io::ReaderStream;
use tracing::debug;

const OBJECTS_DIR: &str = "objects";
const META_DIR: &str = "meta";
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Object store rooted at a local directory
///
/// Layout under the root:
/// - `objects/{key}` holds the object bytes
/// - `meta/{key}` holds the content type recorded at `put` time
///
/// Ranged reads seek into the file and stream at most the requested bytes,
/// so serving a subrange never loads the whole object.
///
/// Writes go to a temporary file in the target directory which is then
/// renamed over the target, so a reader sees either the old or the new
/// object and never a partial one. The content type is written first.
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Create a store rooted at `root`. Directories are created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(OBJECTS_DIR).join(key))
    }

    fn meta_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(META_DIR).join(key))
    }

    /// Convert std::io::Error to BridgeError, keeping missing keys distinct
    fn map_io_error(key: &str, e: std::io::Error) -> BridgeError {
        if e.kind() == std::io::ErrorKind::NotFound {
            BridgeError::NotFound(key.to_string())
        } else {
            BridgeError::Io(e)
        }
    }

    /// Write `data` to `path` through a temp file and rename.
    async fn write_atomic(path: PathBuf, data: Bytes) -> Result<()> {
        let parent = path.parent().map(Path::to_path_buf).ok_or_else(|| {
            BridgeError::OperationFailed(format!("{} has no parent", path.display()))
        })?;
        fs::create_dir_all(&parent).await?;

        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut tmp = NamedTempFile::new_in(&parent)?;
            tmp.write_all(&data)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| BridgeError::OperationFailed(format!("write task failed: {}", e)))??;
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn get(&self, key: &str) -> Result<Bytes> {
        let path = self.object_path(key)?;
        let data = fs::read(&path)
            .await
            .map_err(|e| Self::map_io_error(key, e))?;
        debug!(key, size = data.len(), "Read object");
        Ok(Bytes::from(data))
    }

    async fn get_range(&self, key: &str, start: u64, end: u64) -> Result<ByteStream> {
        let path = self.object_path(key)?;
        let mut file = fs::File::open(&path)
            .await
            .map_err(|e| Self::map_io_error(key, e))?;
        let size = file
            .metadata()
            .await
            .map_err(|e| Self::map_io_error(key, e))?
            .len();
        check_range(key, start, end, size)?;

        file.seek(SeekFrom::Start(start))
            .await
            .map_err(|e| Self::map_io_error(key, e))?;

        let length = end - start + 1;
        debug!(key, start, end, length, "Opened ranged read");

        let reader = file.take(length);
        Ok(Box::pin(ReaderStream::with_capacity(reader, READ_CHUNK_SIZE)))
    }

    async fn head(&self, key: &str) -> Result<ObjectMetadata> {
        let path = self.object_path(key)?;
        let metadata = fs::metadata(&path)
            .await
            .map_err(|e| Self::map_io_error(key, e))?;
        if metadata.is_dir() {
            return Err(BridgeError::NotFound(key.to_string()));
        }

        let content_type = match fs::read_to_string(self.meta_path(key)?).await {
            Ok(value) => Some(value.trim().to_string()).filter(|v| !v.is_empty()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(BridgeError::Io(e)),
        };

        Ok(ObjectMetadata {
            content_length: metadata.len(),
            content_type,
        })
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        let path = self.object_path(key)?;
        let meta_path = self.meta_path(key)?;

        let size = data.len();
        Self::write_atomic(meta_path, Bytes::copy_from_slice(content_type.as_bytes())).await?;
        Self::write_atomic(path, data).await?;

        debug!(key, size, content_type, "Stored object");
        Ok(())
    }
}
