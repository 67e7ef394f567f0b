//! Cache Module
//!
//! Byte-budgeted LRU storage for group values.

mod byteview;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use byteview::ByteView;
pub use lru::{EvictionCallback, LruCache};
pub use stats::CacheStats;
pub use store::SharedCache;
