//! NutriKart Client - HTTP implementations of the core service traits.
//!
//! [`ApiClient`] talks to the storefront backend and implements both
//! [`CatalogServiceTrait`](nutrikart_core::catalog::CatalogServiceTrait) and
//! [`RecommendationServiceTrait`](nutrikart_core::recommendations::RecommendationServiceTrait).

pub mod client;
pub mod config;

pub use client::{ApiClient, DEFAULT_API_URL};
pub use config::{ClientConfig, ConfigError};
