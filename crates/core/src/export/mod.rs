//! Export module - read-only cart export and CSV rendering.

mod cart_export;

pub use cart_export::{CartExport, ExportRow, NutritionTotals};
