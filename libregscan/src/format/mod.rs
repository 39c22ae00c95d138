//! Display helpers for enumerated images.
//!
//! Unknown values render as a dash so that table columns stay aligned.

use crate::digest::CanonicalDigest;
use chrono::{DateTime, Utc};
use chrono_humanize::Humanize;
use humansize::{BINARY, format_size as format_size_human};


/// Placeholder for values the provider did not report.
pub const UNKNOWN: &str = "-";

/// Formats an image size using binary units (KiB, MiB).
///
/// # Examples
///
/// ```
/// use libregscan::format::format_size;
///
/// assert_eq!(format_size(Some(1024 * 1024 * 5)), "5 MiB");
/// assert_eq!(format_size(None), "-");
/// ```
pub fn format_size(size_bytes: Option<u64>) -> String {
    match size_bytes {
        Some(size) => format_size_human(size, BINARY),
        None => UNKNOWN.to_string(),
    }
}

/// Formats a push timestamp relative to now ("a day ago").
pub fn format_pushed(pushed_at: Option<&DateTime<Utc>>) -> String {
    match pushed_at {
        Some(timestamp) => timestamp.humanize(),
        None => UNKNOWN.to_string(),
    }
}

/// Formats a canonical digest the way `docker images` shows image ids.
///
/// # Examples
///
/// ```
/// use libregscan::digest::CanonicalDigest;
/// use libregscan::format::format_digest;
///
/// let digest: CanonicalDigest =
///     "2c73dd0370e688b915c0814e0a533252f69c0a30d06e62918f61b5df932d4d3a".parse().unwrap();
/// assert_eq!(format_digest(Some(&digest)), "2c73dd0370e6");
/// ```
pub fn format_digest(digest: Option<&CanonicalDigest>) -> String {
    digest
        .map(|d| d.short().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Returns `value`, or the placeholder when it is blank.
pub fn or_unknown(value: &str) -> &str {
    if value.trim().is_empty() {
        UNKNOWN
    } else {
        value
    }
}
