//! Manifest parsing and canonical digest extraction.
//!
//! The provider returns the raw manifest document for each image. The image
//! id the local engine uses is the digest of the config blob, so it is read
//! from the manifest's `config` descriptor rather than from the provider's
//! own digest.

pub use oci_spec::image::{Descriptor, ImageIndex, ImageManifest};

use crate::digest::CanonicalDigest;
use crate::error::{Result, ScanError};
use std::str::FromStr;
use tracing::{debug, error};


/// Either a single-platform image manifest or a multi-platform image index.
#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum ManifestOrIndex {
    /// A single-platform image manifest
    Manifest(ImageManifest),
    /// A multi-platform image index
    Index(ImageIndex),
}

impl ManifestOrIndex {
    /// Parse manifest bytes, detecting whether it is a manifest or an index.
    ///
    /// Docker v2 media types (`...distribution.manifest.v2+json`,
    /// `...manifest.list.v2+json`) are recognised as well as OCI ones.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| ScanError::validation_with_source("Failed to parse manifest JSON", e))?;

        let media_type = value
            .get("mediaType")
            .and_then(|v| v.as_str())
            .unwrap_or("");

        let is_index = if media_type.contains("index") || media_type.contains("list") {
            true
        } else if media_type.contains("manifest") {
            false
        } else if value.get("manifests").is_some() {
            true
        } else if value.get("layers").is_some() || value.get("config").is_some() {
            false
        } else {
            return Err(ScanError::validation(
                "Unable to determine if content is a manifest or index",
            ));
        };

        if is_index {
            let index: ImageIndex = serde_json::from_value(value).map_err(|e| {
                ScanError::validation_with_source("Failed to parse image index", e)
            })?;
            Ok(ManifestOrIndex::Index(index))
        } else {
            let manifest: ImageManifest = serde_json::from_value(value).map_err(|e| {
                ScanError::validation_with_source("Failed to parse image manifest", e)
            })?;
            Ok(ManifestOrIndex::Manifest(manifest))
        }
    }

    /// Returns the digest of the config descriptor.
    ///
    /// An index has no config of its own and yields a validation error.
    pub fn config_digest(&self) -> Result<CanonicalDigest> {
        match self {
            ManifestOrIndex::Manifest(manifest) => {
                CanonicalDigest::from_str(&manifest.config().digest().to_string())
            }
            ManifestOrIndex::Index(_) => Err(ScanError::validation(
                "Image index has no config descriptor",
            )),
        }
    }
}

/// Parses `manifest` and returns the canonical digest of its config blob.
///
/// The lookup is structural, so field order inside the document does not
/// matter.
pub fn parse_config_digest(manifest: &str) -> Result<CanonicalDigest> {
    if manifest.trim().is_empty() {
        return Err(ScanError::validation("Manifest is blank"));
    }
    ManifestOrIndex::from_bytes(manifest.as_bytes())?.config_digest()
}

/// Returns the 64-character canonical digest of `manifest`'s config blob,
/// or an empty string when the manifest is blank, has no sha256 config
/// digest, or the digest is truncated.
///
/// Failures are logged and never escalated.
///
/// # Examples
///
/// ```
/// use libregscan::manifest::extract_digest;
///
/// let manifest = r#"{
///   "schemaVersion": 2,
///   "mediaType": "application/vnd.docker.distribution.manifest.v2+json",
///   "config": {
///     "mediaType": "application/vnd.docker.container.image.v1+json",
///     "size": 16528,
///     "digest": "sha256:2c73dd0370e688b915c0814e0a533252f69c0a30d06e62918f61b5df932d4d3a"
///   },
///   "layers": []
/// }"#;
/// assert_eq!(
///     extract_digest(manifest),
///     "2c73dd0370e688b915c0814e0a533252f69c0a30d06e62918f61b5df932d4d3a"
/// );
/// assert_eq!(extract_digest(""), "");
/// ```
pub fn extract_digest(manifest: &str) -> String {
    if manifest.trim().is_empty() {
        debug!("manifest is blank, no canonical digest");
        return String::new();
    }

    match parse_config_digest(manifest) {
        Ok(digest) => digest.to_string(),
        Err(e) => {
            error!(error = %e, "could not read config digest from manifest");
            debug!(manifest, "manifest content");
            String::new()
        }
    }
}
