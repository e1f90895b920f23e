//! Memoizing cache layer for GitDown.
//!
//! This crate provides generic caching traits that decouple cache consumers
//! from the underlying storage mechanism. Two traits form the core API:
//!
//! - [`Cache`]: Factory for named cache buckets
//! - [`CacheBucket`]: Key-value store with optional per-entry expiry
//!
//! [`CacheBucketExt`] layers memoize-on-miss helpers on top of any bucket:
//! [`remember_forever`](CacheBucketExt::remember_forever) and
//! [`remember`](CacheBucketExt::remember).
//!
//! # Implementations
//!
//! - [`NullCache`] / [`NullCacheBucket`]: No-op implementations (always miss)
//! - [`MemoryCache`]: In-process map, expiry driven by a [`Clock`]
//! - [`FileCache`]: File-based implementation with version validation
//!
//! # Example
//!
//! ```
//! use gitdown_cache::{Cache, CacheBucketExt, MemoryCache};
//!
//! let cache = MemoryCache::new();
//! let bucket = cache.bucket("markdown");
//!
//! let first: Result<String, ()> = bucket.remember_forever("k", || Ok("<p>hi</p>".to_owned()));
//! let second: Result<String, ()> = bucket.remember_forever("k", || Ok("unused".to_owned()));
//! assert_eq!(first, second);
//! ```

mod clock;
mod ext;
mod file;
mod memory;

use std::time::Duration;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ext::CacheBucketExt;
pub use file::FileCache;
pub use memory::MemoryCache;

/// A named partition within a [`Cache`].
///
/// Each bucket stores key-value pairs. An entry stored with a TTL stops
/// being returned once the TTL has elapsed; an entry stored without one
/// lives until it is overwritten or forgotten.
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value.
    ///
    /// Returns `None` on cache miss or when the entry has expired.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value in the cache.
    ///
    /// Overwrites any existing entry for the same key.
    ///
    /// # Arguments
    ///
    /// * `key` - Cache key (e.g., a content fingerprint)
    /// * `value` - Raw bytes to cache
    /// * `ttl` - Time to live, `None` keeps the entry forever
    fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>);

    /// Remove an entry. Missing keys are ignored.
    fn forget(&self, key: &str);
}

/// Factory for named cache [`CacheBucket`]s.
///
/// A `Cache` produces buckets that are logically isolated from each other.
/// For example, a file-based cache stores each bucket in a separate
/// subdirectory.
pub trait Cache: Send + Sync {
    /// Open or create a named bucket.
    ///
    /// Calling `bucket` multiple times with the same name may return
    /// independent handles that share the same underlying storage.
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// No-op [`CacheBucket`] that never stores or retrieves data.
///
/// Every `get` returns `None`; every `set` is silently discarded.
#[derive(Debug, Default)]
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) {}

    fn forget(&self, _key: &str) {}
}

/// No-op [`Cache`] that always returns [`NullCacheBucket`]s.
///
/// Use when caching is disabled.
#[derive(Debug, Default)]
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_cache_always_misses() {
        let cache = NullCache;
        let bucket = cache.bucket("markdown");

        assert_eq!(bucket.get("key"), None);

        // Setting a value and reading it back still returns None
        bucket.set("key", b"hello", None);
        assert_eq!(bucket.get("key"), None);
    }

    #[test]
    fn test_null_cache_memoize_calls_producer_every_time() {
        let bucket = NullCache.bucket("markdown");
        let mut calls = 0;

        for _ in 0..3 {
            let value: Result<String, ()> = bucket.remember_forever("k", || {
                calls += 1;
                Ok("v".to_owned())
            });
            assert_eq!(value, Ok("v".to_owned()));
        }

        assert_eq!(calls, 3);
    }
}
