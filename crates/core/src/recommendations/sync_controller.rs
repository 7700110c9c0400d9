//! Keeps displayed recommendations consistent with the latest cart and
//! preferences despite network latency.
//!
//! Every observed change bumps a generation counter and schedules a debounced
//! request tagged with it. A response is applied only while its generation is
//! still the current one, so ordering follows schedule time, not arrival time.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use log::{debug, info, warn};
use rust_decimal::Decimal;
use tokio::sync::watch;

use crate::cart::{CartObserver, CartSnapshot, CartStore, SubscriptionId};
use crate::errors::ServiceError;
use crate::recommendations::recommendations_model::{
    CartItemPayload, HealthCondition, Preferences, RecommendationView, SyncRequest, SyncResult,
};
use crate::recommendations::recommendations_traits::RecommendationServiceTrait;
use crate::recommendations::sync_config::SyncConfig;
use crate::scheduling::{Debouncer, Scheduler};

/// A request waiting in the debounce window.
struct ScheduledSync {
    generation: u64,
    request: SyncRequest,
}

struct SyncState {
    generation: u64,
    loading: bool,
    items: Vec<CartItemPayload>,
    preferences: Preferences,
    result: Option<SyncResult>,
    last_error: Option<String>,
}

impl SyncState {
    fn view(&self) -> RecommendationView {
        RecommendationView {
            result: self.result.clone(),
            loading: self.loading,
            generation: self.generation,
            last_error: self.last_error.clone(),
        }
    }
}

struct SyncInner {
    service: Arc<dyn RecommendationServiceTrait>,
    debouncer: Debouncer<ScheduledSync>,
    state: Mutex<SyncState>,
    view_tx: watch::Sender<RecommendationView>,
}

/// Observes the cart store and preference inputs and keeps a
/// [`RecommendationView`] in sync with them.
///
/// The controller is the only writer of its generation counter and loading
/// flag. Consumers read through [`view`](Self::view) or
/// [`subscribe`](Self::subscribe).
pub struct RecommendationSyncController {
    inner: Arc<SyncInner>,
}

impl RecommendationSyncController {
    pub fn new(
        service: Arc<dyn RecommendationServiceTrait>,
        scheduler: Arc<dyn Scheduler>,
        config: SyncConfig,
    ) -> Self {
        let (view_tx, _) = watch::channel(RecommendationView::default());

        let inner = Arc::new_cyclic(|weak: &Weak<SyncInner>| {
            let weak = weak.clone();
            let debouncer = Debouncer::new(
                scheduler,
                config.debounce,
                move |scheduled: ScheduledSync| {
                    let weak = weak.clone();
                    async move {
                        if let Some(inner) = weak.upgrade() {
                            inner.dispatch(scheduled).await;
                        }
                    }
                },
            );

            SyncInner {
                service,
                debouncer,
                state: Mutex::new(SyncState {
                    generation: 0,
                    loading: false,
                    items: Vec::new(),
                    preferences: config.preferences,
                    result: None,
                    last_error: None,
                }),
                view_tx,
            }
        });

        Self { inner }
    }

    /// Registers the controller as a cart observer and syncs with the
    /// current cart contents.
    pub fn attach(&self, store: &CartStore) -> SubscriptionId {
        let observer: Arc<dyn CartObserver> = self.inner.clone();
        let id = store.subscribe(observer);
        self.inner.on_cart_changed(&store.snapshot());
        id
    }

    /// Stops observing `store`. Any pending request is cancelled.
    pub fn detach(&self, store: &CartStore, id: SubscriptionId) {
        store.unsubscribe(id);
        self.shutdown();
    }

    pub fn set_budget(&self, budget: Decimal) {
        self.inner.update_preferences(|p| p.budget = budget);
    }

    pub fn set_household_size(&self, household_size: u32) {
        self.inner
            .update_preferences(|p| p.household_size = household_size);
    }

    pub fn set_health_condition(&self, health_condition: Option<HealthCondition>) {
        self.inner
            .update_preferences(|p| p.health_condition = health_condition);
    }

    pub fn set_preferences(&self, preferences: Preferences) {
        self.inner.update_preferences(|p| *p = preferences);
    }

    pub fn preferences(&self) -> Preferences {
        self.inner.lock_state().preferences.clone()
    }

    /// Current view of the recommendations.
    pub fn view(&self) -> RecommendationView {
        self.inner.lock_state().view()
    }

    /// Receiver updated on every view change.
    pub fn subscribe(&self) -> watch::Receiver<RecommendationView> {
        self.inner.view_tx.subscribe()
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock_state().generation
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock_state().loading
    }

    /// Cancels the pending debounce, if any. An in-flight request is left to
    /// finish; its result is discarded because the generation moves on.
    pub fn shutdown(&self) {
        let mut state = self.inner.lock_state();
        state.generation += 1;
        state.loading = false;
        self.inner.debouncer.cancel();
        self.inner.publish(&state);
    }
}

impl CartObserver for SyncInner {
    fn on_cart_changed(&self, snapshot: &CartSnapshot) {
        let mut state = self.lock_state();
        state.items = snapshot
            .entries()
            .iter()
            .map(|e| CartItemPayload {
                product_id: e.product.id,
                quantity: e.quantity,
            })
            .collect();
        self.schedule(&mut state);
    }
}

impl SyncInner {
    fn lock_state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Recommendation sync state mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn publish(&self, state: &SyncState) {
        self.view_tx.send_replace(state.view());
    }

    fn update_preferences(&self, update: impl FnOnce(&mut Preferences)) {
        let mut state = self.lock_state();
        let before = state.preferences.clone();
        update(&mut state.preferences);
        if state.preferences == before {
            return;
        }
        self.schedule(&mut state);
    }

    /// Recomputes the request for the current inputs and schedules it.
    fn schedule(&self, state: &mut SyncState) {
        state.generation += 1;

        if state.items.is_empty() {
            // Empty cart: nothing to ask for, and nothing in flight may land.
            debug!(
                "Cart empty at generation {}, clearing recommendations",
                state.generation
            );
            self.debouncer.cancel();
            state.result = None;
            state.last_error = None;
            state.loading = false;
            self.publish(state);
            return;
        }

        let request = SyncRequest::with_items(state.items.clone(), &state.preferences);
        debug!(
            "Scheduling recommendation request generation {} ({} item(s))",
            state.generation,
            state.items.len()
        );
        state.loading = true;
        self.debouncer.trigger(ScheduledSync {
            generation: state.generation,
            request,
        });
        self.publish(state);
    }

    async fn dispatch(&self, scheduled: ScheduledSync) {
        let ScheduledSync {
            generation,
            request,
        } = scheduled;
        debug!("Dispatching recommendation request generation {}", generation);

        let outcome = self.service.recommend(&request).await;

        let mut state = self.lock_state();
        if generation != state.generation || state.items.is_empty() {
            debug!(
                "Discarding recommendation result for generation {} (current {})",
                generation, state.generation
            );
            return;
        }

        match outcome {
            Ok(response) => {
                info!(
                    "Applied {} recommendation(s) for generation {}",
                    response.recommendations.len(),
                    generation
                );
                state.result = Some(SyncResult {
                    generation,
                    recommendations: response.recommendations,
                    summary: response.summary,
                });
                state.last_error = None;
            }
            Err(ServiceError::Superseded) => {
                debug!(
                    "Recommendation request generation {} was superseded by the service",
                    generation
                );
            }
            Err(err) => {
                warn!(
                    "Recommendation request generation {} failed: {}",
                    generation, err
                );
                state.last_error = Some(err.to_string());
            }
        }

        state.loading = false;
        self.publish(&state);
    }
}
