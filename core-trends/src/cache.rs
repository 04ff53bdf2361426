//! Time-to-live cache for backend payloads
//!
//! Entries are invalidated purely by age. A lookup is a hit while
//! `now - fetched_at < ttl`; stale entries stay in place until the next
//! successful fetch replaces them.
//!
//! Concurrent fetches of the same key are ordered by the time they were
//! issued: a response only replaces the stored entry if its request was
//! issued no earlier than the request that produced the stored one.

use bridge_traits::time::Clock;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

/// A cached payload and its timestamps.
struct CacheEntry<V> {
    value: Arc<V>,
    /// When the request that produced `value` was issued
    issued_at: DateTime<Utc>,
    /// When `value` was stored
    fetched_at: DateTime<Utc>,
}

pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V> TtlCache<V> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Returns the value under `key` if it is still fresh.
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        let now = self.clock.now();
        let entries = self.lock();
        let entry = entries.get(key)?;

        if self.is_fresh(entry, now) {
            debug!(key, "cache hit");
            Some(Arc::clone(&entry.value))
        } else {
            debug!(key, "cache entry expired");
            None
        }
    }

    /// Stores `value` for a request issued at `issued_at`.
    ///
    /// Returns `false` (and keeps the stored entry) if the stored entry came
    /// from a request issued later than this one.
    pub fn insert(&self, key: &str, value: Arc<V>, issued_at: DateTime<Utc>) -> bool {
        let fetched_at = self.clock.now();
        let mut entries = self.lock();

        if let Some(existing) = entries.get(key) {
            if existing.issued_at > issued_at {
                debug!(key, "discarding response from an older request");
                return false;
            }
        }

        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                issued_at,
                fetched_at,
            },
        );
        true
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn is_fresh(&self, entry: &CacheEntry<V>, now: DateTime<Utc>) -> bool {
        // A clock that stepped backwards yields a negative age; treat as fresh
        now.signed_duration_since(entry.fetched_at)
            .to_std()
            .map_or(true, |age| age < self.ttl)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
