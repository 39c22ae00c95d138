//! Image selection.
//!
//! Each pattern list is a set of alternatives: an image passes a list when
//! any pattern matches, and an empty list lets every image through. An
//! image is selected when it passes all three lists.

use crate::config::Pull;
use crate::error::{Result, ScanError};
use crate::model::ImageIdentity;
use regex::Regex;


#[derive(Debug, Clone, Default)]
pub struct ImageFilter {
    images: Vec<Regex>,
    tags: Vec<Regex>,
    digests: Vec<Regex>,
}

impl ImageFilter {
    /// Compiles the patterns of the pull settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use libregscan::config::Pull;
    /// use libregscan::filter::ImageFilter;
    ///
    /// let pull = Pull {
    ///     images: vec!["^backend".to_string()],
    ///     ..Pull::default()
    /// };
    /// let filter = ImageFilter::from_config(&pull).unwrap();
    /// assert!(!filter.is_empty());
    /// ```
    pub fn from_config(pull: &Pull) -> Result<Self> {
        Ok(Self {
            images: compile("images", &pull.images)?,
            tags: compile("tags", &pull.tags)?,
            digests: compile("digests", &pull.digests)?,
        })
    }

    /// True when no pattern is configured at all.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.tags.is_empty() && self.digests.is_empty()
    }

    pub fn matches(&self, image: &ImageIdentity) -> bool {
        let name_ok = any_match(&self.images, std::iter::once(image.repository.as_str()));
        let tag_ok = any_match(&self.tags, image.tags.iter().map(String::as_str));
        let digest_ok = any_match(&self.digests, std::iter::once(image.canonical_digest_str()));
        name_ok && tag_ok && digest_ok
    }
}

fn any_match<'a>(patterns: &[Regex], mut values: impl Iterator<Item = &'a str>) -> bool {
    patterns.is_empty() || values.any(|v| patterns.iter().any(|p| p.is_match(v)))
}

fn compile(field: &str, patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| {
                ScanError::config_with_source(
                    format!("Invalid pattern '{}' in remote.pull.{}", p, field),
                    None,
                    e,
                )
            })
        })
        .collect()
}
