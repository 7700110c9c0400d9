//! Recommendation domain models.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BUDGET, DEFAULT_HOUSEHOLD_SIZE};
use crate::errors::ValidationError;

/// Health filter understood by the recommendation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthCondition {
    Diabetic,
    Hypertension,
    WeightLoss,
}

impl HealthCondition {
    pub const ALL: [HealthCondition; 3] = [
        HealthCondition::Diabetic,
        HealthCondition::Hypertension,
        HealthCondition::WeightLoss,
    ];

    /// Wire value sent to the service.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthCondition::Diabetic => "diabetic",
            HealthCondition::Hypertension => "hypertension",
            HealthCondition::WeightLoss => "weight_loss",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthCondition::Diabetic => "Diabetes-Friendly",
            HealthCondition::Hypertension => "Heart-Healthy",
            HealthCondition::WeightLoss => "Weight Management",
        }
    }

    /// Parses a filter value where `"none"` or an empty string mean no filter.
    pub fn parse_filter(value: &str) -> Result<Option<Self>, ValidationError> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        value.parse().map(Some)
    }
}

impl FromStr for HealthCondition {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        HealthCondition::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownHealthCondition(s.to_string()))
    }
}

impl fmt::Display for HealthCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display label for an optional filter.
pub fn condition_label(condition: Option<HealthCondition>) -> &'static str {
    condition.map(|c| c.label()).unwrap_or("General Wellness")
}

/// User preferences that shape recommendations alongside the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub budget: Decimal,
    pub household_size: u32,
    pub health_condition: Option<HealthCondition>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            budget: Decimal::from(DEFAULT_BUDGET),
            household_size: DEFAULT_HOUSEHOLD_SIZE,
            health_condition: None,
        }
    }
}

/// One cart line as sent to the recommendation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemPayload {
    pub product_id: i64,
    pub quantity: u32,
}

/// Body of `POST /recommend`.
///
/// Derived deterministically from the cart snapshot and preferences at the
/// moment it is scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<CartItemPayload>>,
    #[serde(with = "rust_decimal::serde::float")]
    pub budget: Decimal,
    pub household_size: u32,
    pub health_condition: Option<HealthCondition>,
}

impl SyncRequest {
    /// Request reflecting the cart contents.
    pub fn with_items(items: Vec<CartItemPayload>, preferences: &Preferences) -> Self {
        Self {
            items: Some(items),
            budget: preferences.budget,
            household_size: preferences.household_size,
            health_condition: preferences.health_condition,
        }
    }

    /// Cart-less request used by the standalone form.
    pub fn standalone(preferences: &Preferences) -> Self {
        Self {
            items: None,
            budget: preferences.budget,
            household_size: preferences.household_size,
            health_condition: preferences.health_condition,
        }
    }
}

/// A scored product returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedProduct {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    #[serde(default)]
    pub category_name: Option<String>,
    pub price_per_unit: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
    pub score_raw: f64,
    pub score100: u32,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub sugar: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default)]
    pub sodium: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub sat_fat: f64,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Budget breakdown returned next to the recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub total_products: u32,
    pub total_spent: Decimal,
    pub remaining_budget: Decimal,
    pub budget: Decimal,
    pub total_calories: f64,
    pub total_protein: f64,
    pub products_considered: u32,
    pub products_after_filter: u32,
    pub health_condition: Option<HealthCondition>,
    pub household_size: u32,
    #[serde(default = "default_allocation_method")]
    pub allocation_method: String,
}

fn default_allocation_method() -> String {
    "lp".to_string()
}

impl BudgetSummary {
    /// Share of the budget spent, capped at 100.
    pub fn spent_percent(&self) -> Decimal {
        if self.budget <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let percent = self.total_spent / self.budget * Decimal::ONE_HUNDRED;
        percent.min(Decimal::ONE_HUNDRED)
    }
}

/// Response of `POST /recommend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub recommendations: Vec<RecommendedProduct>,
    pub summary: BudgetSummary,
}

/// A response applied by the sync controller, tagged with the generation
/// of the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncResult {
    pub generation: u64,
    pub recommendations: Vec<RecommendedProduct>,
    pub summary: BudgetSummary,
}

/// What consumers of the sync controller observe.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecommendationView {
    /// Last applied result; `None` when nothing applies (e.g. empty cart).
    pub result: Option<SyncResult>,
    /// True from scheduling until the current request settles.
    pub loading: bool,
    /// Generation of the most recently scheduled request.
    pub generation: u64,
    /// Failure of the most recent current request, if it failed.
    pub last_error: Option<String>,
}

impl RecommendationView {
    pub fn recommendations(&self) -> &[RecommendedProduct] {
        self.result
            .as_ref()
            .map(|r| r.recommendations.as_slice())
            .unwrap_or(&[])
    }

    pub fn summary(&self) -> Option<&BudgetSummary> {
        self.result.as_ref().map(|r| &r.summary)
    }
}
