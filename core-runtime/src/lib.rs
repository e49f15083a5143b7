//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the Retune service:
//! - Logging and tracing infrastructure
//! - Configuration management (builder and `RETUNE_*` environment loading)
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the service and server
//! crates depend on. It establishes the logging conventions and the
//! fail-fast configuration pattern used throughout the system.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
