//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for servers and desktops
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides production-ready implementations of the bridge traits:
//! - `ObjectStore` using `tokio::fs` rooted at a local directory
//! - `ObjectStore` held entirely in memory, for tests and development
//! - `HttpClient` using `reqwest`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{LocalObjectStore, ReqwestHttpClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(LocalObjectStore::new("/var/lib/retune"));
//!     let http_client = Arc::new(ReqwestHttpClient::new()?);
//!
//!     // Inject into core dependencies
//!     Ok(())
//! }
//! ```

mod http;
mod memory_store;
mod object_store;

pub use http::ReqwestHttpClient;
pub use memory_store::MemoryObjectStore;
pub use object_store::LocalObjectStore;
