//! Cart observer trait and implementations.

use std::sync::{Arc, Mutex};

use super::CartSnapshot;

/// Trait for receiving cart change notifications.
///
/// The store calls `on_cart_changed` exactly once per applied mutation, in
/// the order mutations were applied, with the post-mutation snapshot.
///
/// # Design Rules
///
/// - `on_cart_changed()` must be fast and non-blocking (schedule work, don't do it)
/// - Implementations must not mutate the store from inside the callback
/// - Reading the store (`snapshot()`) from the callback is allowed
pub trait CartObserver: Send + Sync {
    fn on_cart_changed(&self, snapshot: &CartSnapshot);
}

/// Mock observer for testing - collects every snapshot it is given.
#[derive(Clone, Default)]
pub struct MockCartObserver {
    snapshots: Arc<Mutex<Vec<CartSnapshot>>>,
}

impl MockCartObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected snapshots.
    pub fn snapshots(&self) -> Vec<CartSnapshot> {
        self.snapshots.lock().unwrap().clone()
    }

    /// Returns the revisions of the collected snapshots, in delivery order.
    pub fn revisions(&self) -> Vec<u64> {
        self.snapshots
            .lock()
            .unwrap()
            .iter()
            .map(CartSnapshot::revision)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.lock().unwrap().is_empty()
    }
}

impl CartObserver for MockCartObserver {
    fn on_cart_changed(&self, snapshot: &CartSnapshot) {
        self.snapshots.lock().unwrap().push(snapshot.clone());
    }
}
