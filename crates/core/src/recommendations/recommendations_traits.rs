use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::recommendations::recommendations_model::{RecommendResponse, SyncRequest};

/// Trait for the external recommendation endpoint.
///
/// The scoring behind it is opaque. A request without `items` is the
/// cart-less variant used by the standalone form.
#[async_trait]
pub trait RecommendationServiceTrait: Send + Sync {
    async fn recommend(&self, request: &SyncRequest) -> Result<RecommendResponse, ServiceError>;
}
