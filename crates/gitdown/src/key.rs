//! Content fingerprints used as cache keys.

use sha1::{Digest, Sha1};

/// Compute the cache key for markdown `content`.
///
/// # Hash Format
///
/// Lowercase hex SHA-1 of the raw content (40 characters).
#[must_use]
pub fn fingerprint(content: &str) -> String {
    hex::encode(Sha1::digest(content.as_bytes()))
}
