//! The cart store: single writer over the authoritative cart state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use log::{debug, warn};

use super::cart_model::{CartAction, CartSnapshot, CartState};
use super::cart_traits::CartObserver;
use crate::catalog::Product;
use crate::errors::Result;

/// Handle returned by [`CartStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Owns the cart and serializes every mutation.
///
/// Each mutation runs the reducer, swaps in the new state (aggregates
/// included) and notifies observers before returning. A dispatch lock is held
/// for the whole sequence, so observers see mutations in application order.
pub struct CartStore {
    state: RwLock<Arc<CartState>>,
    observers: RwLock<Vec<(SubscriptionId, Arc<dyn CartObserver>)>>,
    dispatch_lock: Mutex<()>,
    next_subscription: AtomicU64,
}

impl CartStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(Arc::new(CartState::default())),
            observers: RwLock::new(Vec::new()),
            dispatch_lock: Mutex::new(()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Adds `quantity` units of `product`, creating the entry if needed.
    ///
    /// `quantity` must be at least 1; zero is rejected with
    /// [`CartError::InvalidQuantity`](crate::errors::CartError::InvalidQuantity).
    pub fn add(&self, product: Product, quantity: u32) -> Result<CartSnapshot> {
        self.dispatch(CartAction::Add { product, quantity })
    }

    /// Adds a single unit of `product`.
    pub fn add_one(&self, product: Product) -> Result<CartSnapshot> {
        self.add(product, 1)
    }

    /// Sets an absolute quantity. `<= 0` removes the entry; an absent id is left absent.
    pub fn set_quantity(&self, product_id: i64, quantity: i64) -> Result<CartSnapshot> {
        self.dispatch(CartAction::SetQuantity {
            product_id,
            quantity,
        })
    }

    pub fn clear(&self) -> Result<CartSnapshot> {
        self.dispatch(CartAction::Clear)
    }

    /// Consistent point-in-time view of the cart.
    pub fn snapshot(&self) -> CartSnapshot {
        let state = self.state.read().unwrap_or_else(|poisoned| {
            warn!("Cart state lock was poisoned, recovering");
            poisoned.into_inner()
        });
        CartSnapshot::new(Arc::clone(&state))
    }

    /// Current quantity of a product, 0 when absent.
    pub fn quantity_of(&self, product_id: i64) -> u32 {
        self.snapshot().quantity_of(product_id)
    }

    /// Registers an observer for all subsequent mutations.
    pub fn subscribe(&self, observer: Arc<dyn CartObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::SeqCst));
        self.observers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((id, observer));
        id
    }

    /// Removes an observer. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self
            .observers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = observers.len();
        observers.retain(|(sub, _)| *sub != id);
        observers.len() != before
    }

    fn lock_dispatch(&self) -> MutexGuard<'_, ()> {
        self.dispatch_lock.lock().unwrap_or_else(|poisoned| {
            warn!("Cart dispatch lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn dispatch(&self, action: CartAction) -> Result<CartSnapshot> {
        let _guard = self.lock_dispatch();

        let snapshot = {
            let mut state = self.state.write().unwrap_or_else(|poisoned| {
                warn!("Cart state lock was poisoned, recovering");
                poisoned.into_inner()
            });
            let next = state.apply(action)?;
            *state = Arc::new(next);
            CartSnapshot::new(Arc::clone(&state))
        };

        debug!(
            "Cart revision {}: {} item(s), total {}",
            snapshot.revision(),
            snapshot.total_items(),
            snapshot.total_cost()
        );

        // Clone the list so observers may call snapshot() or subscribe().
        let observers: Vec<Arc<dyn CartObserver>> = self
            .observers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer.on_cart_changed(&snapshot);
        }

        Ok(snapshot)
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}
