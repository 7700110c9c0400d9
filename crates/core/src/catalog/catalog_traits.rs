use async_trait::async_trait;

use crate::catalog::catalog_model::{Category, Product};
use crate::errors::ServiceError;

/// Trait for the catalog collaborator.
///
/// Plain request/response; nothing here is coupled to cart state.
#[async_trait]
pub trait CatalogServiceTrait: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, ServiceError>;

    /// Lists products, optionally restricted to one category.
    async fn list_products(&self, category_id: Option<i64>) -> Result<Vec<Product>, ServiceError>;

    /// Fetches one product. `Ok(None)` means the product does not exist.
    async fn get_product(&self, product_id: i64) -> Result<Option<Product>, ServiceError>;
}
