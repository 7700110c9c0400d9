//! Recommendations module - request/response models, the service seam,
//! the cart-driven sync controller and the standalone form flow.

mod form;
mod recommendations_model;
mod recommendations_traits;
mod sync_config;
mod sync_controller;


pub use form::{FormInput, FormPhase, RecommendationForm};
pub use recommendations_model::{
    condition_label, BudgetSummary, CartItemPayload, HealthCondition, Preferences,
    RecommendResponse, RecommendationView, RecommendedProduct, SyncRequest, SyncResult,
};
pub use recommendations_traits::RecommendationServiceTrait;
pub use sync_config::SyncConfig;
pub use sync_controller::RecommendationSyncController;
