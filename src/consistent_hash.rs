//! Consistent Hashing
//!
//! Maps keys onto a ring of peer positions so every node in the cluster
//! agrees on which peer owns a key.
//!
//! Each peer contributes `replicas` virtual positions, `hash("{i}{peer}")`
//! for `i` in `0..replicas`. A key belongs to the first position at or after
//! `hash(key)`, wrapping around to the smallest position.
//!
//! All nodes must use the same hash function and replica count, otherwise
//! they will disagree about ownership.

use std::collections::HashMap;

/// Hash function used to place peers and keys on the ring.
pub type HashFn = fn(&[u8]) -> u32;

/// Virtual positions per peer used by the HTTP pool.
pub const DEFAULT_REPLICAS: usize = 50;

// == Hash Ring ==
/// Sorted ring of virtual peer positions.
///
/// Plain data: callers that share a ring across tasks wrap it in a lock so a
/// lookup never observes a partially rebuilt ring.
#[derive(Debug, Clone)]
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    /// Sorted, deduplicated positions
    positions: Vec<u32>,
    owners: HashMap<u32, String>,
}

impl HashRing {
    // == Constructor ==
    pub fn new(replicas: usize, hash: HashFn) -> Self {
        Self {
            hash,
            replicas,
            positions: Vec::new(),
            owners: HashMap::new(),
        }
    }

    /// Creates a ring hashing with CRC-32 (IEEE).
    pub fn with_replicas(replicas: usize) -> Self {
        Self::new(replicas, crc32fast::hash)
    }

    // == Add ==
    /// Places `replicas` virtual positions for each peer on the ring.
    ///
    /// If two virtual positions collide, the peer added last owns it.
    pub fn add<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for peer in peers {
            let peer = peer.as_ref();
            for i in 0..self.replicas {
                let position = (self.hash)(format!("{}{}", i, peer).as_bytes());
                self.positions.push(position);
                self.owners.insert(position, peer.to_string());
            }
        }
        self.positions.sort_unstable();
        self.positions.dedup();
    }

    // == Get ==
    /// Returns the peer owning `key`, or `None` if the ring is empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.positions.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.positions.partition_point(|&position| position < hash);
        self.positions
            .get(idx % self.positions.len())
            .and_then(|position| self.owners.get(position))
            .map(String::as_str)
    }

    /// Number of virtual positions on the ring.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }
}
