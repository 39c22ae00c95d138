//! Content digests.
//!
//! Two digests describe the same image and they are not interchangeable:
//!
//! - [`ProviderDigest`]: what the registry provider reports, the sha256 of the
//!   manifest document it stores.
//! - [`CanonicalDigest`]: the image id the local container engine uses, which
//!   is the digest of the config blob referenced from the manifest.

use crate::error::{Result, ScanError};
use oci_spec::image::Digest as OciDigest;
use serde::{Deserialize, Serialize};
use sha2::{Digest as Sha2Digest, Sha256};
use std::fmt;
use std::str::FromStr;


/// Algorithm prefix for sha256 digests.
pub const SHA256_PREFIX: &str = "sha256:";

/// Length of a hex-encoded sha256 value.
pub const SHA256_HEX_LEN: usize = 64;

/// A 64-character lowercase hex sha256, without the algorithm prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalDigest(String);

impl CanonicalDigest {
    /// Returns the hex value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the first 12 characters, as `docker images` displays ids.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl FromStr for CanonicalDigest {
    type Err = ScanError;

    /// Accepts either `sha256:<hex>` or the bare 64-character hex value.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let prefixed = if s.starts_with(SHA256_PREFIX) {
            s.to_string()
        } else {
            format!("{}{}", SHA256_PREFIX, s)
        };

        let oci_digest = OciDigest::from_str(&prefixed).map_err(|e| ScanError::Validation {
            message: format!("Invalid digest format: {}", e),
            source: Some(Box::new(e)),
        })?;

        let full = oci_digest.to_string();
        let hex = full.strip_prefix(SHA256_PREFIX).ok_or_else(|| {
            ScanError::validation(format!("Unsupported digest algorithm: {}", full))
        })?;

        if hex.len() != SHA256_HEX_LEN || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ScanError::validation(format!(
                "Expected {} hex characters after '{}', got '{}'",
                SHA256_HEX_LEN, SHA256_PREFIX, hex
            )));
        }

        Ok(CanonicalDigest(hex.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for CanonicalDigest {
    type Error = ScanError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<CanonicalDigest> for String {
    fn from(value: CanonicalDigest) -> Self {
        value.0
    }
}

impl fmt::Display for CanonicalDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Digest of an image as computed by the registry provider.
///
/// Kept verbatim: the provider is the authority on its own identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderDigest(String);

impl ProviderDigest {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks whether this digest is the sha256 of `manifest`.
    ///
    /// # Examples
    ///
    /// ```
    /// use libregscan::digest::ProviderDigest;
    ///
    /// let digest = ProviderDigest::new(
    ///     "sha256:2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
    /// );
    /// assert!(digest.matches_manifest("hello"));
    /// ```
    pub fn matches_manifest(&self, manifest: &str) -> bool {
        let computed = format!("{}{:x}", SHA256_PREFIX, Sha256::digest(manifest.as_bytes()));
        computed == self.0
    }
}

impl From<&str> for ProviderDigest {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for ProviderDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
