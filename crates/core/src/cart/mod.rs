//! Cart module - cart state, reducer transitions, the cart store and its observers.

mod cart_model;
mod cart_store;
mod cart_traits;

#[cfg(test)]
mod cart_store_tests;

pub use cart_model::{CartAction, CartEntry, CartSnapshot, CartState};
pub use cart_store::{CartStore, SubscriptionId};
pub use cart_traits::{CartObserver, MockCartObserver};
