//! Response DTOs for the cache node API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Statistics for one group
#[derive(Debug, Clone, Serialize)]
pub struct GroupStats {
    /// Group name
    pub name: String,
    /// Number of local cache hits
    pub hits: u64,
    /// Number of local cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Values produced by the local loader
    pub local_loads: u64,
    /// Values fetched from peers
    pub peer_loads: u64,
    /// Failed peer fetches
    pub peer_errors: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl GroupStats {
    /// Creates a GroupStats from a cache statistics snapshot
    pub fn new(name: impl Into<String>, stats: &CacheStats) -> Self {
        Self {
            name: name.into(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            local_loads: stats.local_loads,
            peer_loads: stats.peer_loads,
            peer_errors: stats.peer_errors,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// One entry per registered group, sorted by name
    pub groups: Vec<GroupStats>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
