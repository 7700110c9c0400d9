//! Cart export snapshot.
//!
//! Freezes the cart rows, totals, active health filter and nutrition totals
//! at one point in time and renders them as CSV.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use log::debug;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::cart::{CartEntry, CartSnapshot};
use crate::errors::Result;
use crate::recommendations::HealthCondition;

/// One exported cart line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

impl From<&CartEntry> for ExportRow {
    fn from(entry: &CartEntry) -> Self {
        Self {
            name: entry.product.name.clone(),
            quantity: entry.quantity,
            unit_price: entry.product.unit_price(),
            subtotal: entry.subtotal(),
        }
    }
}

/// Nutrient sums over the cart, each weighted by quantity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NutritionTotals {
    pub calories: Decimal,
    pub sugar: Decimal,
    pub protein: Decimal,
    pub fiber: Decimal,
}

impl NutritionTotals {
    fn accumulate(&mut self, entry: &CartEntry) {
        let quantity = Decimal::from(entry.quantity);
        let product = &entry.product;
        self.calories += product.calories.unwrap_or_default() * quantity;
        self.sugar += product.sugar.unwrap_or_default() * quantity;
        self.protein += product.protein.unwrap_or_default() * quantity;
        self.fiber += product.fiber.unwrap_or_default() * quantity;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartExport {
    pub rows: Vec<ExportRow>,
    pub total_items: u64,
    pub total_cost: Decimal,
    /// Display label of the active filter; `None` when no filter is set.
    pub health_filter: Option<&'static str>,
    pub nutrition: NutritionTotals,
}

impl CartExport {
    pub fn from_snapshot(
        snapshot: &CartSnapshot,
        health_condition: Option<HealthCondition>,
    ) -> Self {
        let mut nutrition = NutritionTotals::default();
        for entry in snapshot.entries() {
            nutrition.accumulate(entry);
        }

        Self {
            rows: snapshot.entries().iter().map(ExportRow::from).collect(),
            total_items: snapshot.total_items(),
            total_cost: snapshot.total_cost(),
            health_filter: health_condition.map(|c| c.label()),
            nutrition,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the cart rows followed by a summary block.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = WriterBuilder::new().flexible(true).from_writer(writer);

        for row in &self.rows {
            csv.serialize(row)?;
        }
        if self.rows.is_empty() {
            csv.write_record(["name", "quantity", "unit_price", "subtotal"])?;
        }

        csv.write_record([""])?;
        let summary: [(&str, String); 7] = [
            ("total_items", self.total_items.to_string()),
            ("total_cost", self.total_cost.to_string()),
            ("health_filter", self.health_filter.unwrap_or("None").to_string()),
            ("calories", self.nutrition.calories.to_string()),
            ("sugar", self.nutrition.sugar.to_string()),
            ("protein", self.nutrition.protein.to_string()),
            ("fiber", self.nutrition.fiber.to_string()),
        ];
        for (label, value) in &summary {
            csv.write_record([*label, value.as_str()])?;
        }

        csv.flush()?;
        Ok(())
    }

    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        debug!(
            "Exporting {} cart row(s) to {}",
            self.rows.len(),
            path.display()
        );
        let file = File::create(path)?;
        self.write_csv(file)
    }
}
