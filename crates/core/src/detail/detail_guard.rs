//! Keyed fetch guard for detail views.
//!
//! A detail view shows one item at a time. Each activation hands out a
//! [`FetchTicket`]; a completion is applied only while its ticket is still
//! the active one.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, warn};

use crate::errors::ServiceError;

/// Proof of an activation. Completing with a ticket that is no longer active
/// is rejected as [`ServiceError::Superseded`].
#[derive(Debug, Clone)]
pub struct FetchTicket<K> {
    key: K,
    epoch: u64,
    cancelled: Arc<AtomicBool>,
}

impl<K> FetchTicket<K> {
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Raised once the view moved to another key or was torn down.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// What the detail view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailState<K, T> {
    pub key: Option<K>,
    pub loading: bool,
    /// `None` while loading, on failure, or when the item was not found.
    pub value: Option<T>,
    pub error: Option<String>,
}

impl<K, T> Default for DetailState<K, T> {
    fn default() -> Self {
        Self {
            key: None,
            loading: false,
            value: None,
            error: None,
        }
    }
}

struct GuardState<K, T> {
    epoch: u64,
    active: Option<Arc<AtomicBool>>,
    detail: DetailState<K, T>,
}

pub struct DetailFetchGuard<K, T> {
    state: Mutex<GuardState<K, T>>,
}

impl<K, T> Default for DetailFetchGuard<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> DetailFetchGuard<K, T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GuardState {
                epoch: 0,
                active: None,
                detail: DetailState::default(),
            }),
        }
    }

    /// Cancels the active ticket. Later completions are discarded.
    pub fn teardown(&self) {
        let mut state = self.lock_state();
        if let Some(flag) = state.active.take() {
            flag.store(true, Ordering::SeqCst);
        }
        state.epoch += 1;
        state.detail.loading = false;
    }

    fn lock_state(&self) -> MutexGuard<'_, GuardState<K, T>> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Detail fetch guard mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl<K, T> DetailFetchGuard<K, T>
where
    K: Clone + PartialEq + std::fmt::Debug,
    T: Clone,
{
    /// Switches the view to `key`, cancelling the previous ticket.
    pub fn activate(&self, key: K) -> FetchTicket<K> {
        let mut state = self.lock_state();
        if let Some(previous) = state.active.take() {
            previous.store(true, Ordering::SeqCst);
        }

        state.epoch += 1;
        let cancelled = Arc::new(AtomicBool::new(false));
        state.active = Some(Arc::clone(&cancelled));
        state.detail = DetailState {
            key: Some(key.clone()),
            loading: true,
            value: None,
            error: None,
        };
        debug!("Detail view activated for {:?} (epoch {})", key, state.epoch);

        FetchTicket {
            key,
            epoch: state.epoch,
            cancelled,
        }
    }

    /// Applies a fetch outcome if `ticket` is still active.
    ///
    /// `Ok(None)` means the item does not exist.
    pub fn complete(
        &self,
        ticket: &FetchTicket<K>,
        result: Result<Option<T>, ServiceError>,
    ) -> Result<Option<T>, ServiceError> {
        let mut state = self.lock_state();
        let current = !ticket.is_cancelled()
            && ticket.epoch == state.epoch
            && state.detail.key.as_ref() == Some(&ticket.key);
        if !current {
            debug!("Discarding detail result for {:?}", ticket.key);
            return Err(ServiceError::Superseded);
        }

        state.detail.loading = false;
        match result {
            Ok(value) => {
                state.detail.value = value.clone();
                state.detail.error = None;
                Ok(value)
            }
            Err(ServiceError::Superseded) => Err(ServiceError::Superseded),
            Err(err) => {
                warn!("Detail fetch for {:?} failed: {}", ticket.key, err);
                state.detail.value = None;
                state.detail.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Activates `key`, runs `fetch` and completes with its outcome.
    pub async fn load<F, Fut>(&self, key: K, fetch: F) -> Result<Option<T>, ServiceError>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<Option<T>, ServiceError>>,
    {
        let ticket = self.activate(key.clone());
        let result = fetch(key).await;
        self.complete(&ticket, result)
    }

    pub fn state(&self) -> DetailState<K, T> {
        self.lock_state().detail.clone()
    }
}
