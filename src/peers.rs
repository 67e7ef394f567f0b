//! Peer Capabilities
//!
//! Traits a group uses to locate and query the peer owning a key. The HTTP
//! transport in [`crate::api`] provides the production implementations.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// Locates the peer that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the owning peer, or `None` when the key should be loaded
    /// locally (no peers, or this node owns it).
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

/// Fetches a value from a remote peer.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>>;
}
