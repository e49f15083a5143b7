//! Workspace umbrella crate.
//!
//! Re-exports the crates a host needs to embed the retune pipeline
//! (`core-service`, `core-audio`, `core-streaming`) behind the
//! `desktop-shims` feature, so depending on `retune-workspace` is enough to
//! get a fully wired [`core_service::bootstrap_desktop`].

#[cfg(feature = "desktop-shims")]
pub use core_audio as audio;
#[cfg(feature = "desktop-shims")]
pub use core_service as service;
#[cfg(feature = "desktop-shims")]
pub use core_streaming as streaming;
