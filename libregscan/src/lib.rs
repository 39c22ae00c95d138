//! regscan - Remote Container Registry Scanning Library
//!
//! libregscan discovers the container images hosted in cloud registries,
//! resolves the digest the local container engine will know each image by,
//! and logs the engine in so that the images can be pulled for analysis.
//!
//! # Quick Start
//!
//! ```no_run
//! use libregscan::{Config, RegistryManager};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(None)?;
//!     let mut manager = RegistryManager::from_config(&config)?;
//!
//!     for outcome in manager.pull_all().await {
//!         println!("{}: {:?}", outcome.backend, outcome.outcome);
//!     }
//!     manager.remove_all_pulled().await;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`RegistryManager`] owns one [`RegistryBackend`] per enabled provider
//! - A backend combines an [`AuthenticationSession`], an [`ImageEnumerator`]
//!   and the local container engine
//! - The enumerator walks registries, repositories and images through a
//!   [`service::RegistryService`] and reads canonical digests from manifests
//! - Every external program runs through an [`executor::CommandExecutor`]

#![warn(clippy::all)]

/// Returns the libregscan crate version.
///
/// # Examples
///
/// ```
/// let version = libregscan::version();
/// assert!(!version.is_empty());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub use auth::{AuthenticationSession, LoginReport};
pub use backend::{PullSummary, RegistryBackend, RemoteRegistry};
pub use config::Config;
pub use digest::{CanonicalDigest, ProviderDigest};
pub use enumerator::{Enumeration, ImageEnumerator};
pub use error::{Result, ScanError};
pub use manager::RegistryManager;
pub use manifest::extract_digest;
pub use model::{ImageIdentity, RegistryId};

pub mod auth;
pub mod backend;
pub mod config;
pub mod digest;
pub mod engine;
pub mod enumerator;
pub mod error;
pub mod executor;
pub mod filter;
pub mod format;
pub mod manager;
pub mod manifest;
pub mod model;
pub mod reference;
pub mod service;

#[cfg(test)]
mod testing;
