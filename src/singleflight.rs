//! Request Coalescing
//!
//! Collapses concurrent loads of the same key into a single execution whose
//! result is shared by every caller that asked while it was in flight.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;

// == Flight Group ==
/// Tracks in-flight loads by key.
///
/// The map lock is only held to look up, insert or remove a call record,
/// never while a load runs, so distinct keys never wait on each other.
#[derive(Debug)]
pub struct FlightGroup<T> {
    calls: Mutex<HashMap<String, Arc<OnceCell<T>>>>,
}

impl<T: Clone> FlightGroup<T> {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    // == Do Call ==
    /// Runs `f` for `key` unless a load for `key` is already in flight, in
    /// which case this waits for that load and returns a clone of its result.
    ///
    /// If the caller driving the load is dropped before it finishes, one of
    /// the waiters runs its own `f` instead. The record is removed once the
    /// result is available, or once every caller waiting on it is dropped,
    /// so a later call starts a fresh load.
    pub async fn do_call<F, Fut>(&self, key: &str, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let call = {
            let mut calls = self.calls.lock();
            let call = calls
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()));
            Arc::clone(call)
        };
        let guard = CallGuard {
            calls: &self.calls,
            key,
            call,
        };

        let result = guard.call.get_or_init(f).await.clone();
        drop(guard);
        result
    }

    /// Number of keys with a load currently in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

/// Removes the call record when the last caller holding it goes away.
///
/// A finished call is removed by whoever sees it first. An unfinished call
/// is removed only when no other caller is left to take over the load,
/// which is the case when the map and this guard hold the only references.
struct CallGuard<'a, T> {
    calls: &'a Mutex<HashMap<String, Arc<OnceCell<T>>>>,
    key: &'a str,
    call: Arc<OnceCell<T>>,
}

impl<T> Drop for CallGuard<'_, T> {
    fn drop(&mut self) {
        let mut calls = self.calls.lock();
        let is_current = calls
            .get(self.key)
            .is_some_and(|current| Arc::ptr_eq(current, &self.call));
        if is_current && (self.call.initialized() || Arc::strong_count(&self.call) == 2) {
            calls.remove(self.key);
        }
    }
}

impl<T: Clone> Default for FlightGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}
