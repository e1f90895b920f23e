//! Extension trait for [`CacheBucket`] with string and memoizing helpers.

use std::time::Duration;

use crate::CacheBucket;

/// Convenience methods for [`CacheBucket`].
///
/// Provides `get_string`/`set_string` for UTF-8 strings and the memoize
/// helpers `remember_forever`/`remember`. These are implemented as default
/// methods on an extension trait so that:
///
/// - [`CacheBucket`] stays object-safe
/// - Implementors only need to handle raw bytes
/// - Callers get ergonomic typed access via a blanket impl
pub trait CacheBucketExt: CacheBucket {
    /// Retrieve a cached UTF-8 string.
    ///
    /// Returns `None` on cache miss, expiry, or invalid UTF-8.
    fn get_string(&self, key: &str) -> Option<String> {
        let bytes = self.get(key)?;
        String::from_utf8(bytes).ok()
    }

    /// Store a string value in the cache.
    fn set_string(&self, key: &str, value: &str, ttl: Option<Duration>) {
        self.set(key, value.as_bytes(), ttl);
    }

    /// Return the cached string under `key`, or compute, store and return it.
    ///
    /// The entry never expires. A failing producer stores nothing and its
    /// error is returned as-is.
    fn remember_forever<E>(
        &self,
        key: &str,
        producer: impl FnOnce() -> Result<String, E>,
    ) -> Result<String, E> {
        self.remember_for(key, None, producer)
    }

    /// Like [`remember_forever`](Self::remember_forever), but the stored
    /// entry expires after `ttl`.
    fn remember<E>(
        &self,
        key: &str,
        ttl: Duration,
        producer: impl FnOnce() -> Result<String, E>,
    ) -> Result<String, E> {
        self.remember_for(key, Some(ttl), producer)
    }

    /// Shared implementation of the memoize helpers.
    fn remember_for<E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        producer: impl FnOnce() -> Result<String, E>,
    ) -> Result<String, E> {
        if let Some(hit) = self.get_string(key) {
            tracing::debug!(key, "cache hit");
            return Ok(hit);
        }

        tracing::debug!(key, "cache miss");
        let value = producer()?;
        self.set_string(key, &value, ttl);
        Ok(value)
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Cache, ManualClock, MemoryCache};

    fn bucket_with_clock() -> (Box<dyn CacheBucket>, ManualClock) {
        let clock = ManualClock::new(SystemTime::UNIX_EPOCH);
        let cache = MemoryCache::new().with_clock(clock.clone());
        (cache.bucket("markdown"), clock)
    }

    #[test]
    fn test_get_string_invalid_utf8_is_miss() {
        let (bucket, _clock) = bucket_with_clock();
        bucket.set("bin", &[0xFF, 0xFE], None);

        assert_eq!(bucket.get_string("bin"), None);
    }

    #[test]
    fn test_remember_forever_calls_producer_once() {
        let (bucket, clock) = bucket_with_clock();
        let mut calls = 0;

        for _ in 0..3 {
            let value: Result<String, ()> = bucket.remember_forever("k", || {
                calls += 1;
                Ok("<p>cached</p>".to_owned())
            });
            assert_eq!(value, Ok("<p>cached</p>".to_owned()));
            clock.advance(Duration::from_secs(365 * 24 * 60 * 60));
        }

        assert_eq!(calls, 1);
    }

    #[test]
    fn test_remember_recomputes_after_expiry() {
        let (bucket, clock) = bucket_with_clock();
        let ttl = Duration::from_secs(60);

        let first: Result<String, ()> = bucket.remember("k", ttl, || Ok("first".to_owned()));
        assert_eq!(first, Ok("first".to_owned()));

        clock.advance(Duration::from_secs(59));
        let cached: Result<String, ()> = bucket.remember("k", ttl, || Ok("second".to_owned()));
        assert_eq!(cached, Ok("first".to_owned()));

        clock.advance(Duration::from_secs(1));
        let fresh: Result<String, ()> = bucket.remember("k", ttl, || Ok("second".to_owned()));
        assert_eq!(fresh, Ok("second".to_owned()));
    }

    #[test]
    fn test_remember_failing_producer_stores_nothing() {
        let (bucket, _clock) = bucket_with_clock();

        let failed: Result<String, &str> = bucket.remember_forever("k", || Err("boom"));
        assert_eq!(failed, Err("boom"));
        assert_eq!(bucket.get("k"), None);

        let ok: Result<String, &str> = bucket.remember_forever("k", || Ok("v".to_owned()));
        assert_eq!(ok, Ok("v".to_owned()));
    }
}
