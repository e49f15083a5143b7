//! HTTP Client Abstraction
//!
//! Provides async GET requests whose response bodies are streamed.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::error::Result;
use crate::storage::ByteStream;

/// HTTP GET request builder
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            timeout: None,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }
}

/// Response whose body has not been read yet
///
/// Produced by [`HttpClient::open_stream`] for long-lived bodies such as
/// live radio feeds.
pub struct HttpStream {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: ByteStream,
}

impl HttpStream {
    /// Check if response status is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for HttpStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpStream")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &"<stream>")
            .finish()
    }
}

/// Async HTTP client trait
///
/// Upstream feed fetches go through this trait so they can be mocked in
/// tests. Fallback across sources is the caller's job; implementations make
/// exactly one attempt per call.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::http::{HttpClient, HttpRequest};
///
/// async fn is_live(client: &dyn HttpClient, url: &str) -> Result<bool> {
///     let response = client.open_stream(HttpRequest::get(url)).await?;
///     Ok(response.is_success())
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send a request and return as soon as response headers arrive
    ///
    /// The body is exposed as a stream. The request timeout, if any, bounds
    /// only the wait for headers.
    ///
    /// # Errors
    ///
    /// Returns error if the connection fails or headers do not arrive in time.
    /// A non-2xx status is not an error.
    async fn open_stream(&self, request: HttpRequest) -> Result<HttpStream>;
}
