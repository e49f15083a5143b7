//! Upstream radio feed
//!
//! [`FeedFetcher`] walks a primary/fallback chain of feed URLs and returns
//! the first stream that answers with a 2xx status. Each attempt is bounded
//! by its own timeout; only the wait for response headers counts against it.

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bridge_traits::http::{HttpClient, HttpRequest};
use bridge_traits::storage::ByteStream;
use core_runtime::config::EnvReader;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::error::{Result, StreamError};

/// Primary source plus two fallbacks
pub const MAX_FEED_SOURCES: usize = 3;

const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_FEED_CONTENT_TYPE: &str = "audio/mpeg";

/// Feed source chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Source URLs in priority order
    pub sources: Vec<String>,
    /// Time allowed for each source to answer
    #[serde(with = "duration_ms")]
    pub attempt_timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }
}

impl FeedConfig {
    pub fn new(sources: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Read `RETUNE_FEED_SOURCES` (comma separated) and
    /// `RETUNE_FEED_ATTEMPT_TIMEOUT_MS`.
    pub fn from_env(env: &EnvReader) -> core_runtime::Result<Self> {
        let mut config = Self::default();
        if let Some(sources) = env.list("FEED_SOURCES") {
            config.sources = sources;
        }
        if let Some(timeout) = env.duration_ms("FEED_ATTEMPT_TIMEOUT_MS")? {
            config.attempt_timeout = timeout;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> core_runtime::Result<()> {
        if self.sources.len() > MAX_FEED_SOURCES {
            return Err(core_runtime::Error::Config(format!(
                "At most {} feed sources are supported, got {}",
                MAX_FEED_SOURCES,
                self.sources.len()
            )));
        }
        if let Some(bad) = self
            .sources
            .iter()
            .find(|s| !(s.starts_with("http://") || s.starts_with("https://")))
        {
            return Err(core_runtime::Error::Config(format!(
                "Feed source '{}' is not an http(s) URL",
                bad
            )));
        }
        if self.attempt_timeout.is_zero() {
            return Err(core_runtime::Error::Config(
                "Feed attempt timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

/// An open upstream stream
pub struct FeedStream {
    /// URL that answered
    pub source: String,
    pub content_type: String,
    pub body: ByteStream,
}

impl fmt::Debug for FeedStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedStream")
            .field("source", &self.source)
            .field("content_type", &self.content_type)
            .field("body", &"<stream>")
            .finish()
    }
}

impl IntoResponse for FeedStream {
    fn into_response(self) -> Response {
        let content_type = HeaderValue::from_str(&self.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_FEED_CONTENT_TYPE));
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, content_type),
                (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            ],
            Body::from_stream(self.body),
        )
            .into_response()
    }
}

/// Opens upstream feeds through the injected HTTP client.
pub struct FeedFetcher {
    client: Arc<dyn HttpClient>,
    config: FeedConfig,
}

impl FeedFetcher {
    pub fn new(client: Arc<dyn HttpClient>, config: FeedConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Open the first source that answers with a success status.
    ///
    /// # Errors
    ///
    /// [`StreamError::Upstream`] listing every failed attempt when no source
    /// answers, or when no sources are configured.
    #[instrument(skip(self), fields(sources = self.config.sources.len()))]
    pub async fn open(&self) -> Result<FeedStream> {
        if self.config.sources.is_empty() {
            return Err(StreamError::Upstream {
                attempts: vec!["no feed sources configured".to_string()],
            });
        }

        let timeout = self.config.attempt_timeout;
        let mut attempts = Vec::with_capacity(self.config.sources.len());

        for source in &self.config.sources {
            let request = HttpRequest::get(source.as_str())
                .header("Icy-MetaData", "0")
                .timeout(timeout);

            let failure = match tokio::time::timeout(timeout, self.client.open_stream(request)).await
            {
                Ok(Ok(response)) if response.is_success() => {
                    let content_type = response
                        .header("content-type")
                        .unwrap_or(DEFAULT_FEED_CONTENT_TYPE)
                        .to_string();
                    info!(source = %source, status = response.status, "Connected to feed");
                    return Ok(FeedStream {
                        source: source.clone(),
                        content_type,
                        body: response.body,
                    });
                }
                Ok(Ok(response)) => format!("status {}", response.status),
                Ok(Err(e)) => e.to_string(),
                Err(_) => format!("timed out after {:?}", timeout),
            };

            warn!(source = %source, reason = %failure, "Feed source failed");
            attempts.push(format!("{}: {}", source, failure));
        }

        Err(StreamError::Upstream { attempts })
    }
}
