//! Catalog domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product category as listed by the catalog service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Product as served by the catalog endpoints.
///
/// Nutrition values are per serving and may be missing for some products.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "ProductRecord")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub category_name: Option<String>,
    pub price_per_unit: Option<Decimal>,
    pub serving_size: Option<Decimal>,
    pub calories: Option<Decimal>,
    pub sugar: Option<Decimal>,
    pub sodium: Option<Decimal>,
    pub protein: Option<Decimal>,
    pub fat: Option<Decimal>,
    pub saturated_fat: Option<Decimal>,
    pub fiber: Option<Decimal>,
    pub image_url: Option<String>,
}

/// Wire shape of a product. The backend sends saturated fat under both
/// `saturated_fat` and the legacy `sat_fat` key.
#[derive(Deserialize)]
struct ProductRecord {
    id: i64,
    name: String,
    category_id: i64,
    #[serde(default)]
    category_name: Option<String>,
    #[serde(default)]
    price_per_unit: Option<Decimal>,
    #[serde(default)]
    serving_size: Option<Decimal>,
    #[serde(default)]
    calories: Option<Decimal>,
    #[serde(default)]
    sugar: Option<Decimal>,
    #[serde(default)]
    sodium: Option<Decimal>,
    #[serde(default)]
    protein: Option<Decimal>,
    #[serde(default)]
    fat: Option<Decimal>,
    #[serde(default)]
    saturated_fat: Option<Decimal>,
    #[serde(default)]
    sat_fat: Option<Decimal>,
    #[serde(default)]
    fiber: Option<Decimal>,
    #[serde(default)]
    image_url: Option<String>,
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            category_id: record.category_id,
            category_name: record.category_name,
            price_per_unit: record.price_per_unit,
            serving_size: record.serving_size,
            calories: record.calories,
            sugar: record.sugar,
            sodium: record.sodium,
            protein: record.protein,
            fat: record.fat,
            saturated_fat: record.saturated_fat.or(record.sat_fat),
            fiber: record.fiber,
            image_url: record.image_url,
        }
    }
}

impl Product {
    /// Creates a product with only identity and price set.
    pub fn new(id: i64, name: impl Into<String>, price_per_unit: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            category_id: 0,
            category_name: None,
            price_per_unit: Some(price_per_unit),
            serving_size: None,
            calories: None,
            sugar: None,
            sodium: None,
            protein: None,
            fat: None,
            saturated_fat: None,
            fiber: None,
            image_url: None,
        }
    }

    /// Unit price, with a missing price counting as zero.
    pub fn unit_price(&self) -> Decimal {
        self.price_per_unit.unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_product_deserializes_catalog_payload() {
        let json = r#"{
            "id": 12,
            "name": "Rolled Oats",
            "category_id": 3,
            "category_name": "Breakfast",
            "price_per_unit": "85.00",
            "calories": 389,
            "sugar": 0.9,
            "sat_fat": "1.2",
            "image_url": null
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, 12);
        assert_eq!(product.category_name.as_deref(), Some("Breakfast"));
        assert_eq!(product.unit_price(), dec!(85));
        assert_eq!(product.calories, Some(dec!(389)));
        assert_eq!(product.saturated_fat, Some(dec!(1.2)));
        assert_eq!(product.fiber, None);
    }

    #[test]
    fn test_product_accepts_both_saturated_fat_keys() {
        let json = r#"{
            "id": 1,
            "name": "Paneer",
            "category_id": 1,
            "saturated_fat": "1.20",
            "sat_fat": "1.20"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.saturated_fat, Some(dec!(1.2)));
    }

    #[test]
    fn test_product_round_trips_through_own_serialization() {
        let mut product = Product::new(5, "Curd", dec!(40));
        product.saturated_fat = Some(dec!(2.5));

        let json = serde_json::to_string(&product).unwrap();
        let parsed: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, product);
    }

    #[test]
    fn test_missing_price_counts_as_zero() {
        let mut product = Product::new(1, "Water", dec!(20));
        product.price_per_unit = None;
        assert_eq!(product.unit_price(), Decimal::ZERO);
    }
}
