//! NutriKart Core - cart state, recommendation sync and detail views.
//!
//! This crate holds the client-side domain logic of the NutriKart storefront.
//! It is transport-agnostic: the catalog and recommendation endpoints are
//! reached through traits implemented by the `nutrikart-client` crate.

pub mod cart;
pub mod catalog;
pub mod constants;
pub mod detail;
pub mod errors;
pub mod export;
pub mod recommendations;
pub mod scheduling;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
