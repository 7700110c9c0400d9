//! Cart domain models and the reducer transition.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::errors::CartError;

/// One product line in the cart. Only exists while `quantity > 0`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub product: Product,
    pub quantity: u32,
}

impl CartEntry {
    /// `quantity × price_per_unit`
    pub fn subtotal(&self) -> Decimal {
        self.product.unit_price() * Decimal::from(self.quantity)
    }
}

/// Mutations understood by [`CartState::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Increment an existing entry or insert a new one.
    Add { product: Product, quantity: u32 },
    /// Set an absolute quantity. `<= 0` removes; never creates.
    SetQuantity { product_id: i64, quantity: i64 },
    Clear,
}

/// Immutable cart value.
///
/// Every state is built through [`CartState::from_entries`], so the derived
/// totals always match the entries they were computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct CartState {
    entries: Vec<CartEntry>,
    total_items: u64,
    total_cost: Decimal,
    revision: u64,
}

impl Default for CartState {
    fn default() -> Self {
        Self::from_entries(Vec::new(), 0)
    }
}

impl CartState {
    /// Builds a state, dropping empty lines and recomputing aggregates.
    pub fn from_entries(entries: Vec<CartEntry>, revision: u64) -> Self {
        let entries: Vec<CartEntry> = entries.into_iter().filter(|e| e.quantity > 0).collect();
        let total_items = entries.iter().map(|e| u64::from(e.quantity)).sum();
        let total_cost = entries.iter().map(CartEntry::subtotal).sum();

        Self {
            entries,
            total_items,
            total_cost,
            revision,
        }
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn get(&self, product_id: i64) -> Option<&CartEntry> {
        self.entries.iter().find(|e| e.product.id == product_id)
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn total_cost(&self) -> Decimal {
        self.total_cost
    }

    /// Number of mutations applied to reach this state.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pure transition: returns the next state or rejects the action.
    pub fn apply(&self, action: CartAction) -> Result<CartState, CartError> {
        let mut entries = self.entries.clone();

        match action {
            CartAction::Add { product, quantity } => {
                if quantity == 0 {
                    return Err(CartError::InvalidQuantity {
                        product_id: product.id,
                        quantity: 0,
                    });
                }
                match entries.iter_mut().find(|e| e.product.id == product.id) {
                    Some(entry) => {
                        let next = entry.quantity.checked_add(quantity).ok_or(
                            CartError::InvalidQuantity {
                                product_id: product.id,
                                quantity: i64::from(entry.quantity) + i64::from(quantity),
                            },
                        )?;
                        entry.product = product;
                        entry.quantity = next;
                    }
                    None => entries.push(CartEntry { product, quantity }),
                }
            }
            CartAction::SetQuantity {
                product_id,
                quantity,
            } => {
                if quantity <= 0 {
                    entries.retain(|e| e.product.id != product_id);
                } else if let Some(entry) = entries.iter_mut().find(|e| e.product.id == product_id)
                {
                    entry.quantity = u32::try_from(quantity).map_err(|_| {
                        CartError::InvalidQuantity {
                            product_id,
                            quantity,
                        }
                    })?;
                }
            }
            CartAction::Clear => entries.clear(),
        }

        Ok(CartState::from_entries(entries, self.revision + 1))
    }
}

/// Read-only point-in-time view of the cart.
///
/// Cloning is cheap; the underlying state is shared and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSnapshot {
    state: Arc<CartState>,
}

impl CartSnapshot {
    pub fn new(state: Arc<CartState>) -> Self {
        Self { state }
    }

    pub fn entries(&self) -> &[CartEntry] {
        self.state.entries()
    }

    pub fn get(&self, product_id: i64) -> Option<&CartEntry> {
        self.state.get(product_id)
    }

    pub fn quantity_of(&self, product_id: i64) -> u32 {
        self.get(product_id).map(|e| e.quantity).unwrap_or(0)
    }

    pub fn total_items(&self) -> u64 {
        self.state.total_items()
    }

    pub fn total_cost(&self) -> Decimal {
        self.state.total_cost()
    }

    pub fn revision(&self) -> u64 {
        self.state.revision()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }
}
