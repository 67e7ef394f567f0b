//! API Handlers
//!
//! HTTP request handlers for peer value lookups, statistics and health.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{CacheError, Result};
use crate::group::Registry;
use crate::models::{GroupStats, HealthResponse, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Groups this node serves
    pub registry: Registry,
}

impl AppState {
    /// Creates a new AppState serving the given registry.
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }
}

/// Handler for GET {base_path}/:group/:key
///
/// Returns the raw value bytes for `key` in `group`, loading it on a miss.
pub async fn get_value_handler(
    State(state): State<AppState>,
    Path((group_name, key)): Path<(String, String)>,
) -> Result<Response> {
    lookup(&state, &group_name, &key).await
}

/// Handler for GET {base_path}/:group/
///
/// A request with no key segment is rejected by the group as a bad request.
pub async fn empty_key_handler(
    State(state): State<AppState>,
    Path(group_name): Path<String>,
) -> Result<Response> {
    lookup(&state, &group_name, "").await
}

async fn lookup(state: &AppState, group_name: &str, key: &str) -> Result<Response> {
    let group = state
        .registry
        .get_group(&group_name)
        .ok_or_else(|| CacheError::NotFound(format!("no such group: {}", group_name)))?;

    let value = group.get(key).await?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        value.to_vec(),
    )
        .into_response())
}

/// Handler for GET /stats
///
/// Returns per-group cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let groups = state
        .registry
        .groups()
        .iter()
        .map(|group| GroupStats::new(group.name(), &group.stats()))
        .collect();

    Json(StatsResponse { groups })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
