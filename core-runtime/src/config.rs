//! # Server Configuration Module
//!
//! Provides process-level configuration for the Retune server.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `ServerConfig` holding the settings every component shares: where to
//! listen, where the database and object store live, upload limits and
//! logging. The builder enforces fail-fast validation so that a bad
//! deployment stops at startup instead of on the first request.
//!
//! Component-specific sections (audio processing, upstream feeds) live in
//! their own crates and are loaded through the same [`EnvReader`].
//!
//! ## Usage
//!
//! ### Builder
//!
//! ```ignore
//! use core_runtime::config::ServerConfig;
//!
//! let config = ServerConfig::builder()
//!     .database_path("/var/lib/retune/library.db")
//!     .storage_root("/var/lib/retune/objects")
//!     .build()?;
//! ```
//!
//! ### Environment
//!
//! ```ignore
//! use core_runtime::config::{EnvReader, ServerConfig};
//!
//! // RETUNE_DATABASE_PATH, RETUNE_STORAGE_ROOT, RETUNE_BIND_ADDR, ...
//! let config = ServerConfig::from_env(&EnvReader::from_process())?;
//! ```
//!
//! ## Error Handling
//!
//! Missing or malformed values produce [`Error::Config`] with the variable or
//! setter name in the message.

use crate::error::{Error, Result};
use crate::logging::{parse_log_level, LogFormat, LoggingConfig};
use bridge_traits::time::LogLevel;
use std::collections::HashMap;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Prefix shared by every environment variable the server reads.
pub const ENV_PREFIX: &str = "RETUNE_";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
const MAX_UPLOAD_CEILING_BYTES: usize = 1024 * 1024 * 1024;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;

/// Typed access to `RETUNE_*` configuration variables.
///
/// Reads either the process environment or an injected map, so tests never
/// have to mutate global state.
#[derive(Debug, Clone, Default)]
pub struct EnvReader {
    vars: HashMap<String, String>,
}

impl EnvReader {
    /// Snapshot the `RETUNE_*` variables of the current process.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars()
                .filter(|(k, _)| k.starts_with(ENV_PREFIX))
                .collect(),
        }
    }

    /// Build a reader over explicit key/value pairs (keys include the prefix).
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    fn key(name: &str) -> String {
        format!("{}{}", ENV_PREFIX, name)
    }

    /// Raw value of `RETUNE_{name}`, with blank values treated as unset.
    pub fn string(&self, name: &str) -> Option<String> {
        self.vars
            .get(&Self::key(name))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Parse `RETUNE_{name}` with `FromStr`.
    pub fn parse<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.string(name)
            .map(|raw| {
                raw.parse::<T>().map_err(|e| {
                    Error::Config(format!("Invalid value for {}: {}", Self::key(name), e))
                })
            })
            .transpose()
    }

    /// Comma-separated list in `RETUNE_{name}`; empty entries are dropped.
    pub fn list(&self, name: &str) -> Option<Vec<String>> {
        self.string(name).map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
    }

    /// Millisecond duration in `RETUNE_{name}`.
    pub fn duration_ms(&self, name: &str) -> Result<Option<Duration>> {
        Ok(self.parse::<u64>(name)?.map(Duration::from_millis))
    }
}

/// Process-level configuration shared by every component.
///
/// Use [`ServerConfigBuilder`] or [`ServerConfig::from_env`] to construct.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to
    pub bind_addr: SocketAddr,

    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// Root directory of the local object store
    pub storage_root: PathBuf,

    /// Upper bound on an uploaded request body
    pub max_upload_bytes: usize,

    /// Maximum pooled database connections
    pub db_max_connections: u32,

    /// Logging setup applied at startup
    pub logging: LoggingConfig,
}

impl ServerConfig {
    /// Creates a new builder for constructing a `ServerConfig`.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Load configuration from `RETUNE_*` variables.
    ///
    /// | Variable | Meaning | Default |
    /// |----------|---------|---------|
    /// | `RETUNE_BIND_ADDR` | listen address | `0.0.0.0:3000` |
    /// | `RETUNE_DATABASE_PATH` | SQLite file | required |
    /// | `RETUNE_STORAGE_ROOT` | object store directory | required |
    /// | `RETUNE_MAX_UPLOAD_BYTES` | upload body limit | 50 MiB |
    /// | `RETUNE_DB_MAX_CONNECTIONS` | pool size | 8 |
    /// | `RETUNE_LOG_FORMAT` | `pretty`, `json` or `compact` | build dependent |
    /// | `RETUNE_LOG_LEVEL` | minimum level | `info` |
    /// | `RETUNE_LOG_FILTER` | raw `EnvFilter` directives | none |
    pub fn from_env(env: &EnvReader) -> Result<Self> {
        let mut builder = ServerConfig::builder();

        if let Some(addr) = env.parse::<SocketAddr>("BIND_ADDR")? {
            builder = builder.bind_addr(addr);
        }
        if let Some(path) = env.string("DATABASE_PATH") {
            builder = builder.database_path(path);
        }
        if let Some(root) = env.string("STORAGE_ROOT") {
            builder = builder.storage_root(root);
        }
        if let Some(limit) = env.parse::<usize>("MAX_UPLOAD_BYTES")? {
            builder = builder.max_upload_bytes(limit);
        }
        if let Some(max) = env.parse::<u32>("DB_MAX_CONNECTIONS")? {
            builder = builder.db_max_connections(max);
        }
        if let Some(format) = env.parse::<LogFormat>("LOG_FORMAT")? {
            builder = builder.log_format(format);
        }
        if let Some(level) = env.string("LOG_LEVEL") {
            builder = builder.log_level(parse_log_level(&level)?);
        }
        if let Some(filter) = env.string("LOG_FILTER") {
            builder = builder.log_filter(filter);
        }

        builder.build()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Database path and storage root are not empty
    /// - Upload limit is positive and at most 1 GiB
    /// - Pool size is positive
    pub fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(Error::Config("Database path cannot be empty".to_string()));
        }

        if self.storage_root.as_os_str().is_empty() {
            return Err(Error::Config("Storage root cannot be empty".to_string()));
        }

        if self.max_upload_bytes == 0 {
            return Err(Error::Config(
                "Upload limit must be greater than 0 bytes".to_string(),
            ));
        }

        if self.max_upload_bytes > MAX_UPLOAD_CEILING_BYTES {
            return Err(Error::Config(
                "Upload limit exceeds maximum of 1 GiB".to_string(),
            ));
        }

        if self.db_max_connections == 0 {
            return Err(Error::Config(
                "Database pool needs at least one connection".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`ServerConfig`]
///
/// Required: `database_path`, `storage_root`. Everything else has a default.
#[derive(Default)]
pub struct ServerConfigBuilder {
    bind_addr: Option<SocketAddr>,
    database_path: Option<PathBuf>,
    storage_root: Option<PathBuf>,
    max_upload_bytes: Option<usize>,
    db_max_connections: Option<u32>,
    log_format: Option<LogFormat>,
    log_level: Option<LogLevel>,
    log_filter: Option<String>,
}

impl ServerConfigBuilder {
    /// Sets the listen address.
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = Some(addr);
        self
    }

    /// Sets the database path.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_runtime::config::ServerConfig;
    ///
    /// let builder = ServerConfig::builder()
    ///     .database_path("/var/lib/retune/library.db");
    /// ```
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Sets the object store root directory.
    pub fn storage_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.storage_root = Some(path.into());
        self
    }

    /// Sets the maximum accepted upload size in bytes.
    ///
    /// Default: 50 MiB
    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = Some(bytes);
        self
    }

    /// Sets the database pool size.
    pub fn db_max_connections(mut self, max: u32) -> Self {
        self.db_max_connections = Some(max);
        self
    }

    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.log_format = Some(format);
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    /// Builds the configuration, validating required fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_runtime::config::ServerConfig;
    /// let config = ServerConfig::builder()
    ///     .database_path("/var/lib/retune/library.db")
    ///     .storage_root("/var/lib/retune/objects")
    ///     .build()?;
    /// # Ok::<(), core_runtime::Error>(())
    /// ```
    pub fn build(self) -> Result<ServerConfig> {
        let database_path = self.database_path.ok_or_else(|| {
            Error::Config(
                "Database path is required. Use .database_path() or RETUNE_DATABASE_PATH."
                    .to_string(),
            )
        })?;

        let storage_root = self.storage_root.ok_or_else(|| {
            Error::Config(
                "Storage root is required. Use .storage_root() or RETUNE_STORAGE_ROOT."
                    .to_string(),
            )
        })?;

        let bind_addr = match self.bind_addr {
            Some(addr) => addr,
            None => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|e| Error::Internal(format!("Bad default bind address: {}", e)))?,
        };

        let mut logging = LoggingConfig::default();
        if let Some(format) = self.log_format {
            logging = logging.with_format(format);
        }
        if let Some(level) = self.log_level {
            logging = logging.with_level(level);
        }
        if let Some(filter) = self.log_filter {
            logging = logging.with_filter(filter);
        }

        let config = ServerConfig {
            bind_addr,
            database_path,
            storage_root,
            max_upload_bytes: self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            db_max_connections: self
                .db_max_connections
                .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
            logging,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required() -> ServerConfigBuilder {
        ServerConfig::builder()
            .database_path("/db/library.db")
            .storage_root("/srv/objects")
    }

    #[test]
    fn test_builder_requires_database_path() {
        let result = ServerConfig::builder().storage_root("/srv/objects").build();

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Database path is required"));
    }

    #[test]
    fn test_builder_requires_storage_root() {
        let result = ServerConfig::builder()
            .database_path("/db/library.db")
            .build();

        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Storage root is required"));
    }

    #[test]
    fn test_builder_defaults() {
        let config = required().build().unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.database_path, PathBuf::from("/db/library.db"));
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(config.db_max_connections, 8);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_validate_rejects_zero_upload_limit() {
        let result = required().max_upload_bytes(0).build();
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("must be greater than 0"));
    }

    #[test]
    fn test_validate_rejects_excessive_upload_limit() {
        let result = required().max_upload_bytes(2 * 1024 * 1024 * 1024).build();
        assert!(result.unwrap_err().to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_validate_rejects_empty_pool() {
        assert!(required().db_max_connections(0).build().is_err());
    }

    #[test]
    fn test_from_env_reads_prefixed_variables() {
        let env = EnvReader::from_pairs([
            ("RETUNE_BIND_ADDR", "127.0.0.1:8080"),
            ("RETUNE_DATABASE_PATH", "/tmp/retune.db"),
            ("RETUNE_STORAGE_ROOT", "/tmp/objects"),
            ("RETUNE_MAX_UPLOAD_BYTES", "1048576"),
            ("RETUNE_LOG_FORMAT", "json"),
            ("RETUNE_LOG_LEVEL", "debug"),
        ]);

        let config = ServerConfig::from_env(&env).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.storage_root, PathBuf::from("/tmp/objects"));
        assert_eq!(config.max_upload_bytes, 1_048_576);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_from_env_reports_bad_values() {
        let env = EnvReader::from_pairs([
            ("RETUNE_DATABASE_PATH", "/tmp/retune.db"),
            ("RETUNE_STORAGE_ROOT", "/tmp/objects"),
            ("RETUNE_BIND_ADDR", "not-an-address"),
        ]);

        let err = ServerConfig::from_env(&env).unwrap_err().to_string();
        assert!(err.contains("RETUNE_BIND_ADDR"));
    }

    #[test]
    fn test_env_reader_helpers() {
        let env = EnvReader::from_pairs([
            ("RETUNE_FEED_SOURCES", " http://a/live , ,http://b/live"),
            ("RETUNE_TIMEOUT_MS", "2500"),
            ("RETUNE_BLANK", "   "),
            ("OTHER_VALUE", "ignored"),
        ]);

        assert_eq!(
            env.list("FEED_SOURCES").unwrap(),
            vec!["http://a/live".to_string(), "http://b/live".to_string()]
        );
        assert_eq!(
            env.duration_ms("TIMEOUT_MS").unwrap(),
            Some(Duration::from_millis(2500))
        );
        assert_eq!(env.string("BLANK"), None);
        assert_eq!(env.string("VALUE"), None);
        assert!(env.parse::<u32>("MISSING").unwrap().is_none());
    }

    #[test]
    fn test_debug_hides_sink() {
        let config = required().build().unwrap();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("ServerConfig"));
        assert!(rendered.contains("library.db"));
    }
}
