//! In-process cache implementation.
//!
//! [`MemoryCache`] keeps every bucket in one mutex-guarded map. An expired
//! entry is dropped when its key is read, and every `set` sweeps expired
//! entries from all buckets, so keys that are never read again do not
//! accumulate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use crate::clock::{Clock, SystemClock};
use crate::{Cache, CacheBucket};

#[derive(Debug)]
struct Entry {
    data: Vec<u8>,
    expires_at: Option<SystemTime>,
}

type Entries = Arc<Mutex<HashMap<String, Entry>>>;

/// In-memory [`Cache`].
///
/// Buckets opened from the same `MemoryCache` share storage, so two handles
/// to bucket `"markdown"` see each other's entries while bucket `"other"`
/// stays isolated.
pub struct MemoryCache {
    entries: Entries,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock: Arc::new(SystemClock),
        }
    }
}

impl MemoryCache {
    /// Create an empty cache driven by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the clock used to evaluate expiry.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(MemoryCacheBucket {
            name: name.to_owned(),
            entries: Arc::clone(&self.entries),
            clock: Arc::clone(&self.clock),
        })
    }
}

struct MemoryCacheBucket {
    name: String,
    entries: Entries,
    clock: Arc<dyn Clock>,
}

impl MemoryCacheBucket {
    fn slot(&self, key: &str) -> String {
        format!("{}/{key}", self.name)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CacheBucket for MemoryCacheBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let slot = self.slot(key);
        let now = self.clock.now();
        let mut entries = self.lock();

        let expired = entries
            .get(&slot)?
            .expires_at
            .is_some_and(|expires_at| now >= expires_at);
        if expired {
            entries.remove(&slot);
            return None;
        }

        entries.get(&slot).map(|entry| entry.data.clone())
    }

    fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) {
        let now = self.clock.now();
        let expires_at = ttl.and_then(|ttl| now.checked_add(ttl));
        let mut entries = self.lock();

        entries.retain(|_, entry| entry.expires_at.is_none_or(|expires_at| now < expires_at));
        entries.insert(
            self.slot(key),
            Entry {
                data: value.to_vec(),
                expires_at,
            },
        );
    }

    fn forget(&self, key: &str) {
        self.lock().remove(&self.slot(key));
    }
}
