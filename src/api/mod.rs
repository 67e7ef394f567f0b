//! API Module
//!
//! HTTP transport between cache nodes.
//!
//! # Endpoints
//! - `GET {base_path}:group/:key` - Fetch a value for a peer
//! - `GET /stats` - Per-group cache statistics
//! - `GET /health` - Health check endpoint
//!
//! [`HttpPool`] is the client side: it picks the owning peer for a key and
//! fetches from that peer's value endpoint.

pub mod handlers;
pub mod pool;
pub mod routes;

pub use handlers::*;
pub use pool::{HttpGetter, HttpPool};
pub use routes::{create_router, DEFAULT_BASE_PATH};
