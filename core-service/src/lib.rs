//! Core service façade and bootstrap helpers.
//!
//! This crate wires injected collaborators (object store, repositories,
//! codec, HTTP client) into the operations the HTTP layer exposes: the
//! upload pipeline, library queries and track streaming. Servers enable the
//! `desktop-shims` feature to get [`bootstrap_desktop`], which builds every
//! collaborator from configuration.

pub mod error;
pub mod library;
pub mod streaming;
pub mod upload;

pub use error::{CoreError, Result};
pub use upload::{sanitize_file_name, UploadPolicy, UploadReceipt, UploadRequest};

use std::sync::Arc;

use bridge_traits::storage::ObjectStore;
use bridge_traits::time::{Clock, SystemClock};
use core_audio::{AudioCodec, PitchShifter};
use core_library::{PlaylistRepository, TrackRepository};
use core_metadata::MetadataExtractor;
use core_streaming::FeedFetcher;

#[cfg(feature = "desktop-shims")]
use core_audio::{CodecAdapter, ProcessingConfig};
#[cfg(feature = "desktop-shims")]
use core_runtime::config::ServerConfig;
#[cfg(feature = "desktop-shims")]
use core_streaming::FeedConfig;

/// Aggregated handle to every collaborator the core requires.
pub struct CoreDependencies {
    pub object_store: Arc<dyn ObjectStore>,
    pub tracks: Arc<dyn TrackRepository>,
    pub playlists: Arc<dyn PlaylistRepository>,
    pub codec: Arc<dyn AudioCodec>,
    pub feed: Arc<FeedFetcher>,
    pub shifter: PitchShifter,
    pub metadata: MetadataExtractor,
    pub upload_policy: UploadPolicy,
    pub clock: Arc<dyn Clock>,
}

impl CoreDependencies {
    /// Construct a dependency bundle with the default shifter, upload policy
    /// and system clock.
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        tracks: Arc<dyn TrackRepository>,
        playlists: Arc<dyn PlaylistRepository>,
        codec: Arc<dyn AudioCodec>,
        feed: Arc<FeedFetcher>,
    ) -> Self {
        Self {
            object_store,
            tracks,
            playlists,
            codec,
            feed,
            shifter: PitchShifter::default(),
            metadata: MetadataExtractor::new(),
            upload_policy: UploadPolicy::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_shifter(mut self, shifter: PitchShifter) -> Self {
        self.shifter = shifter;
        self
    }

    pub fn with_upload_policy(mut self, policy: UploadPolicy) -> Self {
        self.upload_policy = policy;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Primary façade exposed to the HTTP layer.
#[derive(Clone)]
pub struct CoreService {
    deps: Arc<CoreDependencies>,
}

impl CoreService {
    /// Create a new service from the provided dependencies.
    pub fn new(deps: CoreDependencies) -> Self {
        Self {
            deps: Arc::new(deps),
        }
    }

    /// Access the dependencies being used by the service.
    pub fn dependencies(&self) -> Arc<CoreDependencies> {
        Arc::clone(&self.deps)
    }
}

/// Build a service backed by local disk, SQLite and reqwest.
///
/// ```ignore
/// use core_runtime::config::{EnvReader, ServerConfig};
///
/// let env = EnvReader::from_process();
/// let server = ServerConfig::from_env(&env)?;
/// let core = core_service::bootstrap_desktop(
///     &server,
///     &ProcessingConfig::from_env(&env)?,
///     FeedConfig::from_env(&env)?,
/// )
/// .await?;
/// ```
#[cfg(feature = "desktop-shims")]
pub async fn bootstrap_desktop(
    server: &ServerConfig,
    processing: &ProcessingConfig,
    feed: FeedConfig,
) -> Result<CoreService> {
    use bridge_desktop::{LocalObjectStore, ReqwestHttpClient};
    use core_library::{create_pool, DatabaseConfig, SqlitePlaylistRepository, SqliteTrackRepository};

    let pool = create_pool(
        DatabaseConfig::new(&server.database_path).max_connections(server.db_max_connections),
    )
    .await?;

    let http_client = ReqwestHttpClient::new()
        .map_err(|e| CoreError::InitializationFailed(e.to_string()))?;
    let codec = CodecAdapter::from_config(&processing.encoder)?;

    let deps = CoreDependencies::new(
        Arc::new(LocalObjectStore::new(&server.storage_root)),
        Arc::new(SqliteTrackRepository::new(pool.clone())),
        Arc::new(SqlitePlaylistRepository::new(pool)),
        Arc::new(codec),
        Arc::new(FeedFetcher::new(Arc::new(http_client), feed)),
    )
    .with_shifter(processing.shifter())
    .with_upload_policy(UploadPolicy::default().with_max_bytes(server.max_upload_bytes));

    tracing::info!(
        storage_root = %server.storage_root.display(),
        factor = processing.pitch_factor.value(),
        interpolation = %processing.interpolation,
        "Core service ready"
    );
    Ok(CoreService::new(deps))
}
