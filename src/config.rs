//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::env;

use crate::api::DEFAULT_BASE_PATH;

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Byte budget for each group's local cache (0 = unlimited)
    pub cache_bytes: usize,
    /// HTTP server port
    pub server_port: u16,
    /// This node's base address as peers reach it
    pub self_addr: String,
    /// Base addresses of the other nodes in the cluster
    pub peers: Vec<String>,
    /// Path prefix for peer value requests
    pub base_path: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BYTES` - Per-group byte budget (default: 2 MiB)
    /// - `SERVER_PORT` - HTTP server port (default: 8001)
    /// - `SELF_ADDR` - This node's address (default: `http://localhost:{port}`)
    /// - `PEERS` - Comma-separated peer addresses (default: none)
    /// - `BASE_PATH` - Value endpoint prefix (default: `/_groupcache/`)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.server_port);

        Self {
            cache_bytes: env::var("CACHE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_bytes),
            server_port,
            self_addr: env::var("SELF_ADDR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| format!("http://localhost:{}", server_port)),
            peers: env::var("PEERS")
                .map(|v| parse_peer_list(&v))
                .unwrap_or_default(),
            base_path: env::var("BASE_PATH").unwrap_or(defaults.base_path),
        }
    }

    /// Returns every node in the cluster, including this one exactly once.
    pub fn peer_list(&self) -> Vec<String> {
        let mut peers = vec![self.self_addr.clone()];
        for peer in &self.peers {
            if !peers.contains(peer) {
                peers.push(peer.clone());
            }
        }
        peers
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_bytes: 2 << 20,
            server_port: 8001,
            self_addr: "http://localhost:8001".to_string(),
            peers: Vec::new(),
            base_path: DEFAULT_BASE_PATH.to_string(),
        }
    }
}

/// Splits a comma-separated address list, dropping blanks and trailing `/`.
fn parse_peer_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|peer| peer.trim().trim_end_matches('/'))
        .filter(|peer| !peer.is_empty())
        .map(str::to_string)
        .collect()
}
