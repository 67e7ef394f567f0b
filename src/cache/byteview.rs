//! Byte View Module
//!
//! Defines the immutable byte payload stored in and returned by the cache.

use std::fmt;
use std::sync::Arc;

// == Byte View ==
/// An immutable view of cached bytes.
///
/// Construction copies the input and [`ByteView::to_vec`] hands out a fresh
/// copy, so nothing a caller holds can alias the cache's storage.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ByteView {
    bytes: Arc<[u8]>,
}

impl ByteView {
    // == Constructor ==
    /// Creates a view holding a copy of `bytes`.
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: Arc::from(bytes),
        }
    }

    // == Length ==
    /// Returns the payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    // == To Vec ==
    /// Returns a copy of the payload.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::from(bytes),
        }
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView")
            .field("len", &self.bytes.len())
            .field("bytes", &String::from_utf8_lossy(&self.bytes))
            .finish()
    }
}
