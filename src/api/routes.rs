//! API Routes
//!
//! Configures the Axum router a node exposes to its peers.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{
    empty_key_handler, get_value_handler, health_handler, stats_handler, AppState,
};

/// Default path prefix for peer value requests.
pub const DEFAULT_BASE_PATH: &str = "/_groupcache/";

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET {base_path}:group/:key` - Fetch a value (raw bytes)
/// - `GET {base_path}:group/` - Missing key, answered with 400
/// - `GET /stats` - Per-group cache statistics
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState, base_path: &str) -> Router {
    let base_path = normalize_base_path(base_path);
    let value_route = format!("{}:group/:key", base_path);
    let empty_key_route = format!("{}:group/", base_path);

    Router::new()
        .route(&value_route, get(get_value_handler))
        .route(&empty_key_route, get(empty_key_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Ensures the base path starts and ends with `/`.
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}
