//! Data model shared by the scanning pipeline.
//!
//! Provider payload types ([`Repository`], [`ImageDetail`], [`Image`], ...)
//! deserialize directly from the provider's camelCase JSON. [`ImageIdentity`]
//! is the unified record handed to the rest of the agent, and
//! [`LookupTables`] holds the state later pull-reference composition reads.

use crate::config::is_wildcard_registry_id;
use crate::digest::{CanonicalDigest, ProviderDigest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::warn;

#[cfg(test)]
mod tests;

/// Registry scope a provider call is made against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegistryId {
    /// The default registry of the logged-in account.
    Default,
    /// An explicit registry (account) id.
    Account(String),
}

impl RegistryId {
    /// Maps a configured id to a scope. Blank and wildcard ids mean default.
    pub fn from_config(id: &str) -> Self {
        let id = id.trim();
        if id.is_empty() || is_wildcard_registry_id(id) {
            RegistryId::Default
        } else {
            RegistryId::Account(id.to_string())
        }
    }

    /// Returns the explicit id, or `None` for the default registry.
    pub fn as_account(&self) -> Option<&str> {
        match self {
            RegistryId::Default => None,
            RegistryId::Account(id) => Some(id),
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, RegistryId::Default)
    }
}

impl fmt::Display for RegistryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryId::Default => f.write_str("default"),
            RegistryId::Account(id) => f.write_str(id),
        }
    }
}

/// A repository as listed by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub repository_name: String,
    /// Base of every pull reference for images in this repository.
    #[serde(default)]
    pub repository_uri: String,
    #[serde(default)]
    pub registry_id: Option<String>,
}

/// Per-image metadata listed for a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDetail {
    #[serde(default)]
    pub registry_id: String,
    #[serde(default)]
    pub repository_name: String,
    pub image_digest: ProviderDigest,
    #[serde(default)]
    pub image_tags: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub image_pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image_size_in_bytes: Option<u64>,
}

/// Key for a batch image lookup: a digest, a tag, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageIdentifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_tag: Option<String>,
}

impl ImageIdentifier {
    pub fn by_digest(digest: impl Into<String>) -> Self {
        Self {
            image_digest: Some(digest.into()),
            image_tag: None,
        }
    }

    /// An identifier is usable only if it carries a non-blank tag or digest.
    pub fn is_resolvable(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.image_digest) || present(&self.image_tag)
    }
}

impl fmt::Display for ImageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.image_tag, &self.image_digest) {
            (Some(tag), Some(digest)) => write!(f, "{}@{}", tag, digest),
            (Some(tag), None) => f.write_str(tag),
            (None, Some(digest)) => f.write_str(digest),
            (None, None) => f.write_str("<none>"),
        }
    }
}

/// An image returned by a batch lookup, carrying its manifest document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default)]
    pub registry_id: String,
    #[serde(default)]
    pub repository_name: String,
    #[serde(default)]
    pub image_id: ImageIdentifier,
    #[serde(default)]
    pub image_manifest: String,
}

/// A per-image failure reported inside an otherwise successful batch lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFailure {
    #[serde(default)]
    pub image_id: ImageIdentifier,
    #[serde(default)]
    pub failure_code: Option<String>,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

impl fmt::Display for ImageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.image_id,
            self.failure_code.as_deref().unwrap_or("UnknownFailure"),
            self.failure_reason.as_deref().unwrap_or("no reason given")
        )
    }
}

/// Response of a batch image lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetImageOutput {
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub failures: Vec<ImageFailure>,
}

/// One remote image, unified across the three provider calls.
///
/// Equality and hashing use `(registry_id, repository, provider_digest)`
/// only, so a set of identities never holds the same image twice.
#[derive(Debug, Clone, Serialize)]
pub struct ImageIdentity {
    pub registry_id: String,
    pub repository: String,
    pub provider_digest: ProviderDigest,
    pub tags: Vec<String>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub size_bytes: Option<u64>,
    #[serde(skip)]
    pub manifest: String,
    pub primary_tag: Option<String>,
    /// `None` when the manifest could not be parsed; the image is kept.
    pub canonical_digest: Option<CanonicalDigest>,
}

impl ImageIdentity {
    /// Returns the canonical digest, or an empty string when unknown.
    pub fn canonical_digest_str(&self) -> &str {
        self.canonical_digest
            .as_ref()
            .map(CanonicalDigest::as_str)
            .unwrap_or("")
    }

    /// Returns a compact `registry/repository@digest` label for logs.
    pub fn label(&self) -> String {
        format!(
            "{}/{}@{}",
            self.registry_id, self.repository, self.provider_digest
        )
    }
}

impl PartialEq for ImageIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.registry_id == other.registry_id
            && self.repository == other.repository
            && self.provider_digest == other.provider_digest
    }
}

impl Eq for ImageIdentity {}

impl Hash for ImageIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.registry_id.hash(state);
        self.repository.hash(state);
        self.provider_digest.hash(state);
    }
}

/// State built by one enumeration run and read by pull-reference composition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupTables {
    repository_uris: HashMap<String, String>,
    digest_tags: HashMap<CanonicalDigest, String>,
}

impl LookupTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the URI of a repository, keyed by name only.
    ///
    /// A same-named repository in another registry replaces the earlier URI.
    pub fn record_repository(&mut self, name: &str, uri: &str) {
        if let Some(previous) = self.repository_uris.insert(name.to_string(), uri.to_string())
            && previous != uri
        {
            warn!(
                repository = name,
                previous = %previous,
                uri = uri,
                "repository name seen in several registries, keeping the latest uri"
            );
        }
    }

    /// Records the tag for a canonical digest. Last write wins.
    pub fn record_tag(&mut self, digest: &CanonicalDigest, tag: &str) {
        self.digest_tags.insert(digest.clone(), tag.to_string());
    }

    pub fn repository_uri(&self, name: &str) -> Option<&str> {
        self.repository_uris.get(name).map(String::as_str)
    }

    pub fn tag_for(&self, digest: &CanonicalDigest) -> Option<&str> {
        self.digest_tags.get(digest).map(String::as_str)
    }

    pub fn repository_count(&self) -> usize {
        self.repository_uris.len()
    }

    pub fn clear(&mut self) {
        self.repository_uris.clear();
        self.digest_tags.clear();
    }
}

/// Accepts RFC 3339 strings (AWS CLI v2) and epoch seconds (AWS CLI v1).
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Epoch(f64),
        Text(String),
    }

    let raw = Option::<RawTimestamp>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(RawTimestamp::Epoch(secs)) => {
            let whole = secs.trunc() as i64;
            let nanos = ((secs - secs.trunc()) * 1_000_000_000.0).round() as u32;
            DateTime::from_timestamp(whole, nanos.min(999_999_999))
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {}", secs)))
        }
        Some(RawTimestamp::Text(text)) => DateTime::parse_from_rfc3339(&text)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom),
    }
}
