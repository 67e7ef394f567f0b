//! Cache Groups
//!
//! A [`Group`] is a named cache namespace: a byte-budgeted local cache, a
//! loader for misses, and optionally a set of peers that own part of the
//! key space. The [`Registry`] maps group names to groups so the transport
//! layer can route requests.
//!
//! # Lookup flow
//! 1. Empty keys are rejected.
//! 2. A local hit is returned directly.
//! 3. On a miss, concurrent callers for the key share one load. The load asks
//!    the owning peer first (if any) and falls back to the local loader, whose
//!    result is stored in the local cache.
//!
//! Errors are never cached: after a failed load the next call starts over.
//! There is no timeout on a load; a stalled loader stalls every caller
//! waiting on that key.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{ByteView, CacheStats, SharedCache};
use crate::error::{CacheError, Result};
use crate::peers::{PeerGetter, PeerPicker};
use crate::singleflight::FlightGroup;

// == Loader ==
/// Loads the value for a key that is not cached anywhere.
///
/// Its error is returned verbatim to every caller waiting on the key.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

/// Adapts a plain function into a [`Loader`].
pub struct LoaderFn<F>(F);

impl<F> LoaderFn<F>
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> Loader for LoaderFn<F>
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        (self.0)(key)
    }
}

// == Group ==
/// A named cache namespace with its own loader and peer set.
pub struct Group {
    name: String,
    loader: Box<dyn Loader>,
    main_cache: SharedCache,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    flight: FlightGroup<Result<ByteView>>,
}

impl Group {
    // == Constructor ==
    /// Creates a group with a byte budget (0 = unlimited) and a loader.
    pub fn new(name: impl Into<String>, max_bytes: usize, loader: impl Loader + 'static) -> Self {
        Self {
            name: name.into(),
            loader: Box::new(loader),
            main_cache: SharedCache::new(max_bytes),
            peers: OnceLock::new(),
            flight: FlightGroup::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Register Peers ==
    /// Installs the peer picker used to route misses.
    ///
    /// # Panics
    /// Panics if peers were already registered for this group.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) {
        if self.peers.set(peers).is_err() {
            panic!("register_peers called more than once for group {}", self.name);
        }
    }

    // == Get ==
    /// Returns the value for `key`, loading it on a miss.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::InvalidRequest("key is required".to_string()));
        }

        if let Some(value) = self.main_cache.get(key) {
            debug!(group = %self.name, key, "cache hit");
            return Ok(value);
        }

        self.load(key).await
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.main_cache.stats()
    }

    async fn load(&self, key: &str) -> Result<ByteView> {
        self.flight
            .do_call(key, || async move {
                if let Some(peer) = self.peers.get().and_then(|peers| peers.pick_peer(key)) {
                    match self.get_from_peer(peer.as_ref(), key).await {
                        Ok(value) => return Ok(value),
                        Err(err) => {
                            self.main_cache.record_peer_error();
                            warn!(
                                group = %self.name,
                                key,
                                error = %err,
                                "failed to get from peer, loading locally"
                            );
                        }
                    }
                }
                self.get_locally(key).await
            })
            .await
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        info!(group = %self.name, key, "loading from local source");
        self.main_cache.record_local_load();

        let bytes = self.loader.load(key).await.map_err(CacheError::loader)?;
        let value = ByteView::new(&bytes);
        self.main_cache.add(key, value.clone());
        Ok(value)
    }

    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let bytes = peer.get(&self.name, key).await?;
        self.main_cache.record_peer_load();
        Ok(ByteView::from(bytes))
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("cache", &self.main_cache)
            .field("has_peers", &self.peers.get().is_some())
            .finish()
    }
}

// == Registry ==
/// Name-to-group table shared by the process.
///
/// Cloning is cheap; clones see the same groups.
#[derive(Clone, Default)]
pub struct Registry {
    groups: Arc<RwLock<HashMap<String, Arc<Group>>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // == Create Group ==
    /// Creates and registers a group, replacing any group with the same name.
    pub fn create_group(
        &self,
        name: impl Into<String>,
        max_bytes: usize,
        loader: impl Loader + 'static,
    ) -> Arc<Group> {
        let group = Arc::new(Group::new(name, max_bytes, loader));
        let previous = self
            .groups
            .write()
            .insert(group.name().to_string(), Arc::clone(&group));
        if previous.is_some() {
            warn!(group = %group.name(), "replaced existing group");
        }
        info!(group = %group.name(), max_bytes, "group created");
        group
    }

    // == Get Group ==
    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// Returns all groups sorted by name.
    pub fn groups(&self) -> Vec<Arc<Group>> {
        let mut groups: Vec<Arc<Group>> = self.groups.read().values().cloned().collect();
        groups.sort_by(|a, b| a.name().cmp(b.name()));
        groups
    }

    pub fn group_names(&self) -> Vec<String> {
        self.groups()
            .iter()
            .map(|group| group.name().to_string())
            .collect()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("groups", &self.group_names())
            .finish()
    }
}
