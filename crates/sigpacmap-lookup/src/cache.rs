//! Coordinate-keyed parcel cache with TTL expiry and LRU eviction.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use sigpacmap_core::config::CacheSettings;
use sigpacmap_core::models::{LatLng, ParcelRecord};

#[derive(Debug, Clone)]
struct CacheEntry {
    record: ParcelRecord,
    stored_at: Instant,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    /// LRU bookkeeping, oldest first. Invariant: no duplicate keys, and its
    /// length equals the live entry count at all times.
    access_order: Vec<String>,
}

/// Bounded parcel cache keyed by rounded coordinates.
///
/// Keys round both coordinates to the configured decimal precision, so two
/// clicks that round to the same key are the same location. Reads expire
/// entries lazily; writes evict the single least-recently-used key once
/// `max_size` is reached. `max_size == 0` disables caching entirely.
///
/// Interior state is Mutex-confined; lock poisoning only occurs when
/// another thread panicked while holding the lock.
pub struct CoordinateCache {
    settings: CacheSettings,
    inner: Mutex<CacheInner>,
}

impl CoordinateCache {
    pub fn new(settings: CacheSettings) -> Self {
        Self {
            settings,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    /// Whether writes will be accepted. Callers gate lookups on this.
    pub fn enabled(&self) -> bool {
        self.settings.enabled && self.settings.max_size > 0
    }

    /// Cached record for these coordinates, if present and fresh.
    ///
    /// A hit marks the key most recently used; an expired entry is removed
    /// and misses. A miss never touches the recency bookkeeping.
    pub fn get(&self, coords: LatLng) -> Option<ParcelRecord> {
        let key = self.key_for(coords);
        let ttl = Duration::from_millis(self.settings.ttl);
        let mut inner = self.inner.lock().unwrap();

        let fresh = match inner.entries.get(&key) {
            Some(entry) if entry.stored_at.elapsed() < ttl => Some(entry.record.clone()),
            Some(_) => None, // expired
            None => return None,
        };

        match fresh {
            Some(record) => {
                touch(&mut inner.access_order, &key);
                Some(record)
            }
            None => {
                inner.entries.remove(&key);
                remove_key(&mut inner.access_order, &key);
                None
            }
        }
    }

    /// Store a record under these coordinates.
    ///
    /// No-op when caching is disabled. At capacity the least-recently-used
    /// key is evicted before the insert.
    pub fn set(&self, coords: LatLng, record: ParcelRecord) {
        if !self.enabled() {
            return;
        }

        let key = self.key_for(coords);
        let mut inner = self.inner.lock().unwrap();

        if inner.access_order.len() >= self.settings.max_size {
            let lru = inner.access_order.remove(0);
            inner.entries.remove(&lru);
        }

        inner.entries.insert(
            key.clone(),
            CacheEntry {
                record,
                stored_at: Instant::now(),
            },
        );
        touch(&mut inner.access_order, &key);
    }

    /// Drop all entries and recency bookkeeping.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.clear();
        inner.access_order.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key_for(&self, coords: LatLng) -> String {
        let precision = self.settings.precision as usize;
        format!(
            "{:.precision$}_{:.precision$}",
            coords.lat, coords.lng
        )
    }
}

/// Mark a key most recently used: remove any previous occurrence, append.
fn touch(order: &mut Vec<String>, key: &str) {
    remove_key(order, key);
    order.push(key.to_owned());
}

fn remove_key(order: &mut Vec<String>, key: &str) {
    if let Some(position) = order.iter().position(|k| k == key) {
        order.remove(position);
    }
}
