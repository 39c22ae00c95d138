//! Pull references.
//!
//! A pull reference is what the container engine is handed to retrieve an
//! image: `<repository-uri>:<tag>`. Parsing goes through
//! `oci_spec::distribution::Reference` so malformed values are rejected
//! before the engine sees them.

use crate::error::{Result, ScanError};
use oci_spec::distribution::Reference as OciReference;
use std::fmt;
use std::str::FromStr;


/// A validated image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference(OciReference);

impl FromStr for Reference {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        let oci_reference = OciReference::from_str(s).map_err(|e| ScanError::Validation {
            message: format!("Invalid image reference '{}': {}", s, e),
            source: Some(Box::new(e)),
        })?;
        Ok(Reference(oci_reference))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Composes `<repository_uri>:<tag>`.
///
/// Returns an empty string when either part is blank, which callers treat as
/// "not resolvable yet".
///
/// # Examples
///
/// ```
/// use libregscan::reference::compose_pull_reference;
///
/// let uri = "111111111111.dkr.ecr.us-east-1.amazonaws.com/backend";
/// assert_eq!(
///     compose_pull_reference(uri, "v1"),
///     "111111111111.dkr.ecr.us-east-1.amazonaws.com/backend:v1"
/// );
/// assert_eq!(compose_pull_reference(uri, ""), "");
/// ```
pub fn compose_pull_reference(repository_uri: &str, tag: &str) -> String {
    let repository_uri = repository_uri.trim();
    let tag = tag.trim();
    if repository_uri.is_empty() || tag.is_empty() {
        return String::new();
    }
    format!("{}:{}", repository_uri, tag)
}
