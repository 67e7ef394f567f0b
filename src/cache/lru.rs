//! LRU Cache Module
//!
//! Byte-budgeted least-recently-used store.
//!
//! Entries live in a slot vector and are linked into a doubly linked recency
//! list by slot index:
//! - `head` = most recently used
//! - `tail` = least recently used
//!
//! Freed slots are recycled, so a steady-state cache stops allocating nodes.

use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use crate::cache::ByteView;

/// Callback invoked once for every entry evicted by the budget.
pub type EvictionCallback = Box<dyn FnMut(&str, &ByteView) + Send>;

#[derive(Debug)]
struct Node {
    key: String,
    value: ByteView,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Cache ==
/// Fixed-byte-budget LRU store keyed by string.
///
/// Every entry costs `key.len() + value.len()` bytes. A `max_bytes` of 0
/// disables eviction.
pub struct LruCache {
    max_bytes: usize,
    used_bytes: usize,
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    on_evicted: Option<EvictionCallback>,
}

impl LruCache {
    // == Constructor ==
    /// Creates an empty cache holding at most `max_bytes` (0 = unlimited).
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            used_bytes: 0,
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            on_evicted: None,
        }
    }

    /// Creates an empty cache that reports every eviction to `on_evicted`.
    pub fn with_eviction_callback(max_bytes: usize, on_evicted: EvictionCallback) -> Self {
        Self {
            on_evicted: Some(on_evicted),
            ..Self::new(max_bytes)
        }
    }

    // == Get ==
    /// Looks up a key and marks it most recently used on a hit.
    pub fn get(&mut self, key: &str) -> Option<ByteView> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        self.node(idx).map(|node| node.value.clone())
    }

    // == Add ==
    /// Inserts or updates `key`, then evicts until the budget holds again.
    ///
    /// Returns the number of entries evicted by this call. An entry larger
    /// than the whole budget is inserted and then evicted immediately.
    pub fn add(&mut self, key: &str, value: ByteView) -> usize {
        if let Some(&idx) = self.index.get(key) {
            self.move_to_front(idx);
            let new_len = value.len();
            if let Some(old) = self
                .node_mut(idx)
                .map(|node| std::mem::replace(&mut node.value, value))
            {
                self.used_bytes = self.used_bytes + new_len - old.len();
            }
        } else {
            let cost = key.len() + value.len();
            let idx = self.alloc(Node {
                key: key.to_string(),
                value,
                prev: None,
                next: None,
            });
            self.index.insert(key.to_string(), idx);
            self.attach_front(idx);
            self.used_bytes += cost;
        }

        let mut evicted = 0;
        while self.max_bytes != 0 && self.used_bytes > self.max_bytes {
            if self.remove_oldest().is_none() {
                break;
            }
            evicted += 1;
        }
        evicted
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry, firing the eviction callback.
    pub fn remove_oldest(&mut self) -> Option<(String, ByteView)> {
        let idx = self.tail?;
        self.detach(idx);
        let node = self.slots.get_mut(idx)?.take()?;
        self.free.push(idx);
        self.index.remove(&node.key);
        self.used_bytes -= node.key.len() + node.value.len();

        trace!(key = %node.key, bytes = node.value.len(), "evicted entry");
        if let Some(callback) = self.on_evicted.as_mut() {
            callback(&node.key, &node.value);
        }
        Some((node.key, node.value))
    }

    // == Length ==
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Bytes currently accounted to keys and values.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Checks for a key without touching its recency.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Slot List Plumbing ==
    fn node(&self, idx: usize) -> Option<&Node> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    fn alloc(&mut self, node: Node) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.detach(idx);
        self.attach_front(idx);
    }

    fn detach(&mut self, idx: usize) {
        let Some((prev, next)) = self.node(idx).map(|node| (node.prev, node.next)) else {
            return;
        };

        match prev {
            Some(p) => {
                if let Some(prev_node) = self.node_mut(p) {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(next_node) = self.node_mut(n) {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = None;
        }
    }

    fn attach_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(h) => {
                if let Some(head_node) = self.node_mut(h) {
                    head_node.prev = Some(idx);
                }
            }
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }
}

impl fmt::Debug for LruCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("max_bytes", &self.max_bytes)
            .field("used_bytes", &self.used_bytes)
            .field("len", &self.index.len())
            .field("has_eviction_callback", &self.on_evicted.is_some())
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn view(s: &str) -> ByteView {
        ByteView::from(s)
    }

    /// Keys from least to most recently used, walking tail to head.
    fn order_lru_to_mru(cache: &LruCache) -> Vec<String> {
        let mut keys = Vec::new();
        let mut cursor = cache.tail;
        while let Some(idx) = cursor {
            let node = cache.node(idx).unwrap();
            keys.push(node.key.clone());
            cursor = node.prev;
        }
        keys
    }

    #[test]
    fn test_lru_new() {
        let lru = LruCache::new(0);
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
        assert_eq!(lru.used_bytes(), 0);
    }

    #[test]
    fn test_get_hit_and_miss() {
        let mut lru = LruCache::new(0);
        lru.add("key1", view("1234"));

        assert_eq!(lru.get("key1").unwrap().to_string(), "1234");
        assert!(lru.get("key2").is_none());
    }

    #[test]
    fn test_remove_oldest_on_budget() {
        let (k1, k2, k3) = ("key1", "key2", "k3");
        let (v1, v2, v3) = ("value1", "value2", "v3");
        let cap = k1.len() + k2.len() + v1.len() + v2.len();
        let mut lru = LruCache::new(cap);

        lru.add(k1, view(v1));
        lru.add(k2, view(v2));
        lru.add(k3, view(v3));

        assert!(lru.get("key1").is_none());
        assert_eq!(lru.len(), 2);
    }

    #[test]
    fn test_budget_for_single_pair_keeps_latest() {
        let mut lru = LruCache::new("key1".len() + "1234".len());

        lru.add("key1", view("1234"));
        let evicted = lru.add("key2", view("5678"));

        assert_eq!(evicted, 1);
        assert_eq!(lru.len(), 1);
        assert!(!lru.contains("key1"));
        assert_eq!(lru.get("key2").unwrap().to_string(), "5678");
    }

    #[test]
    fn test_eviction_callback_fires_once_per_key() {
        let evicted: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        let mut lru = LruCache::with_eviction_callback(
            10,
            Box::new(move |key, value| {
                sink.lock().unwrap().push((key.to_string(), value.to_string()));
            }),
        );

        lru.add("key1", view("123456"));
        lru.add("k2", view("k2"));
        lru.add("k3", view("k3"));
        lru.add("k4", view("k4"));

        let evicted = evicted.lock().unwrap();
        assert_eq!(
            *evicted,
            vec![
                ("key1".to_string(), "123456".to_string()),
                ("k2".to_string(), "k2".to_string()),
            ]
        );
    }

    #[test]
    fn test_get_protects_from_eviction() {
        let mut lru = LruCache::new(6);

        lru.add("a", view("1"));
        lru.add("b", view("2"));
        lru.add("c", view("3"));

        // Touch 'a' so 'b' becomes the oldest
        lru.get("a");
        lru.add("d", view("4"));

        assert!(lru.contains("a"));
        assert!(!lru.contains("b"));
        assert_eq!(order_lru_to_mru(&lru), vec!["c", "a", "d"]);
    }

    #[test]
    fn test_update_adjusts_bytes_and_recency() {
        let mut lru = LruCache::new(0);

        lru.add("a", view("1"));
        lru.add("b", view("22"));
        assert_eq!(lru.used_bytes(), 5);

        lru.add("a", view("1111"));

        assert_eq!(lru.len(), 2);
        assert_eq!(lru.used_bytes(), 8);
        assert_eq!(order_lru_to_mru(&lru), vec!["b", "a"]);
    }

    #[test]
    fn test_update_shrink_then_grow_over_budget() {
        let mut lru = LruCache::new(8);

        lru.add("a", view("1"));
        lru.add("b", view("1"));
        lru.add("b", view("123456"));

        // 'a' is evicted, 'b' fits exactly
        assert!(!lru.contains("a"));
        assert_eq!(lru.used_bytes(), 7);
    }

    #[test]
    fn test_oversized_entry_is_evicted_immediately() {
        let mut lru = LruCache::new(4);

        lru.add("k", view("v"));
        let evicted = lru.add("huge", view("0123456789"));

        assert_eq!(evicted, 2);
        assert!(lru.is_empty());
        assert_eq!(lru.used_bytes(), 0);
    }

    #[test]
    fn test_zero_budget_never_evicts() {
        let mut lru = LruCache::new(0);

        for i in 0..1000 {
            lru.add(&format!("key{}", i), view("some value"));
        }

        assert_eq!(lru.len(), 1000);
    }

    #[test]
    fn test_slots_are_reused_after_eviction() {
        let mut lru = LruCache::new(4);

        for i in 0..100 {
            lru.add(&format!("k{}", i), view("v"));
        }

        assert_eq!(lru.len(), 1);
        assert!(lru.slots.len() <= 2, "slots grew to {}", lru.slots.len());
    }

    #[test]
    fn test_remove_oldest_empty() {
        let mut lru = LruCache::new(10);
        assert!(lru.remove_oldest().is_none());
    }

    #[test]
    fn test_order_after_multiple_touches() {
        let mut lru = LruCache::new(0);

        lru.add("a", view("1"));
        lru.add("b", view("1"));
        lru.add("c", view("1"));

        lru.get("a");
        lru.get("c");
        lru.get("b");

        assert_eq!(lru.remove_oldest().unwrap().0, "a");
        assert_eq!(lru.remove_oldest().unwrap().0, "c");
        assert_eq!(lru.remove_oldest().unwrap().0, "b");
        assert!(lru.is_empty());
    }
}
