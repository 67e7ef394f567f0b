//! Group Cache - A distributed read-through cache
//!
//! Each node keeps a byte-budgeted LRU per named group and loads misses
//! either from the peer that owns the key (by consistent hashing) or from a
//! user-supplied loader. Concurrent misses for one key share a single load.

pub mod api;
pub mod cache;
pub mod config;
pub mod consistent_hash;
pub mod error;
pub mod group;
pub mod models;
pub mod peers;
pub mod singleflight;

pub use api::{AppState, HttpPool};
pub use cache::ByteView;
pub use config::Config;
pub use error::{CacheError, Result};
pub use group::{Group, Loader, LoaderFn, Registry};
pub use peers::{PeerGetter, PeerPicker};
