//! Catalog module - product and category models plus the catalog service seam.

mod catalog_model;
mod catalog_traits;

pub use catalog_model::{Category, Product};
pub use catalog_traits::CatalogServiceTrait;
