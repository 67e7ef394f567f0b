//! Cache Store Module
//!
//! Thread-safe wrapper around [`LruCache`] used by each group.

use parking_lot::Mutex;

use crate::cache::{ByteView, CacheStats, LruCache};

#[derive(Debug, Default)]
struct Inner {
    /// Built on the first `add`, so reading an empty store never allocates
    lru: Option<LruCache>,
    stats: CacheStats,
}

// == Shared Cache ==
/// Mutex-guarded, lazily initialised LRU store.
///
/// The lock covers only in-memory bookkeeping; callers never hold it across
/// I/O.
#[derive(Debug)]
pub struct SharedCache {
    max_bytes: usize,
    inner: Mutex<Inner>,
}

impl SharedCache {
    // == Constructor ==
    /// Creates a store with a byte budget (0 = unlimited).
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            inner: Mutex::new(Inner::default()),
        }
    }

    // == Get ==
    /// Looks up a key, counting the hit or miss.
    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut inner = self.inner.lock();
        let value = inner.lru.as_mut().and_then(|lru| lru.get(key));
        match value {
            Some(_) => inner.stats.record_hit(),
            None => inner.stats.record_miss(),
        }
        value
    }

    // == Add ==
    /// Stores a value, evicting older entries past the budget.
    pub fn add(&self, key: &str, value: ByteView) {
        let mut inner = self.inner.lock();
        let max_bytes = self.max_bytes;
        let evicted = inner
            .lru
            .get_or_insert_with(|| LruCache::new(max_bytes))
            .add(key, value);
        inner.stats.record_evictions(evicted);
    }

    // == Record Local Load ==
    /// Counts a call into the local loader.
    pub fn record_local_load(&self) {
        self.inner.lock().stats.record_local_load();
    }

    // == Record Peer Load ==
    /// Counts a value fetched from a peer.
    pub fn record_peer_load(&self) {
        self.inner.lock().stats.record_peer_load();
    }

    // == Record Peer Error ==
    /// Counts a failed peer fetch.
    pub fn record_peer_error(&self) {
        self.inner.lock().stats.record_peer_error();
    }

    // == Stats ==
    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.lru.as_ref().map_or(0, LruCache::len));
        stats
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.inner.lock().lru.as_ref().map_or(0, LruCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true once the first value has been stored.
    pub fn is_initialized(&self) -> bool {
        self.inner.lock().lru.is_some()
    }
}
