//! HTTP Peer Pool
//!
//! Routes keys to peer nodes over HTTP. The pool owns the consistent-hash
//! ring for the cluster and one client per peer.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, info};

use super::routes::normalize_base_path;
use crate::consistent_hash::{HashRing, DEFAULT_REPLICAS};
use crate::error::{CacheError, Result};
use crate::peers::{PeerGetter, PeerPicker};

// == HTTP Getter ==
/// Fetches values from one peer's `{base_url}{group}/{key}` endpoint.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    base_url: String,
    client: Client,
}

impl HttpGetter {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the request URL, escaping group and key as path segments.
    fn url_for(&self, group: &str, key: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| CacheError::Internal(format!("invalid peer url {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| CacheError::Internal(format!("peer url cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .push(group)
            .push(key);
        Ok(url)
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>> {
        let url = self.url_for(group, key)?;
        debug!(%url, "fetching from peer");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CacheError::Peer(e.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(CacheError::Peer(format!(
                "server returned: {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CacheError::Peer(format!("reading response body: {}", e)))?;
        Ok(body.to_vec())
    }
}

#[derive(Debug)]
struct PoolState {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

// == HTTP Pool ==
/// Peer picker backed by a consistent-hash ring of HTTP peers.
///
/// `self_addr` is this node's own base address (e.g. `http://10.0.0.1:8001`);
/// keys it owns are loaded locally.
#[derive(Debug)]
pub struct HttpPool {
    self_addr: String,
    base_path: String,
    client: Client,
    state: RwLock<PoolState>,
}

impl HttpPool {
    // == Constructor ==
    pub fn new(self_addr: impl Into<String>, base_path: &str) -> Self {
        Self {
            self_addr: self_addr.into(),
            base_path: normalize_base_path(base_path),
            client: Client::new(),
            state: RwLock::new(PoolState {
                ring: HashRing::with_replicas(DEFAULT_REPLICAS),
                getters: HashMap::new(),
            }),
        }
    }

    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    // == Set Peers ==
    /// Replaces the peer set. The new ring is built before the swap, so
    /// concurrent lookups see either the old or the new ring.
    pub fn set_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let peers: Vec<String> = peers.into_iter().map(|p| p.as_ref().to_string()).collect();

        let mut ring = HashRing::with_replicas(DEFAULT_REPLICAS);
        ring.add(&peers);

        let getters = peers
            .iter()
            .map(|peer| {
                let getter = HttpGetter::new(format!("{}{}", peer, self.base_path), self.client.clone());
                (peer.clone(), Arc::new(getter))
            })
            .collect();

        *self.state.write() = PoolState { ring, getters };
        info!(self_addr = %self.self_addr, peers = ?peers, "peer set updated");
    }

    /// Returns the registered peer addresses, sorted.
    pub fn peers(&self) -> Vec<String> {
        let mut peers: Vec<String> = self.state.read().getters.keys().cloned().collect();
        peers.sort();
        peers
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.state.read();
        let peer = state.ring.get(key)?;
        if peer == self.self_addr {
            return None;
        }

        info!(self_addr = %self.self_addr, peer, key, "picked peer");
        state
            .getters
            .get(peer)
            .map(|getter| Arc::clone(getter) as Arc<dyn PeerGetter>)
    }
}
