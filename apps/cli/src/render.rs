//! Plain-text rendering for terminal output.

use std::fmt::Write;

use nutrikart_core::cart::CartSnapshot;
use nutrikart_core::catalog::{Category, Product};
use nutrikart_core::recommendations::{condition_label, BudgetSummary, RecommendedProduct};
use nutrikart_core::utils::format::{format_currency, format_percent};

pub fn render_categories(categories: &[Category]) -> String {
    let mut out = String::new();
    for category in categories {
        let _ = writeln!(out, "{:>4}  {}", category.id, category.name);
    }
    out
}

pub fn render_products(products: &[Product]) -> String {
    let mut out = String::new();
    for product in products {
        let _ = writeln!(
            out,
            "{:>4}  {:<32} {:>8}",
            product.id,
            product.name,
            format_currency(product.unit_price())
        );
    }
    out
}

pub fn render_product(product: &Product) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (#{})", product.name, product.id);
    if let Some(category) = &product.category_name {
        let _ = writeln!(out, "  Category: {}", category);
    }
    let _ = writeln!(out, "  Price:    {}", format_currency(product.unit_price()));

    let nutrients = [
        ("Calories", product.calories, "kcal"),
        ("Sugar", product.sugar, "g"),
        ("Protein", product.protein, "g"),
        ("Fiber", product.fiber, "g"),
        ("Fat", product.fat, "g"),
        ("Sat. fat", product.saturated_fat, "g"),
        ("Sodium", product.sodium, "mg"),
    ];
    for (label, value, unit) in nutrients {
        if let Some(value) = value {
            let _ = writeln!(out, "  {:<9} {} {}", format!("{}:", label), value.normalize(), unit);
        }
    }
    out
}

pub fn render_cart(snapshot: &CartSnapshot) -> String {
    let mut out = String::new();
    if snapshot.is_empty() {
        out.push_str("Cart is empty\n");
        return out;
    }
    for entry in snapshot.entries() {
        let _ = writeln!(
            out,
            "{:>3} x {:<32} {:>8}",
            entry.quantity,
            entry.product.name,
            format_currency(entry.subtotal())
        );
    }
    let _ = writeln!(
        out,
        "{} item(s), total {}",
        snapshot.total_items(),
        format_currency(snapshot.total_cost())
    );
    out
}

pub fn render_recommendations(
    recommendations: &[RecommendedProduct],
    summary: Option<&BudgetSummary>,
) -> String {
    let mut out = String::new();
    if recommendations.is_empty() {
        out.push_str("No recommendations\n");
    }
    for (rank, product) in recommendations.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {:<32} {:>3} x {:>7} = {:>8}  score {}/100",
            rank + 1,
            product.name,
            product.quantity,
            format_currency(product.price_per_unit),
            format_currency(product.subtotal),
            product.score100
        );
    }

    if let Some(summary) = summary {
        let _ = writeln!(
            out,
            "Spent {} of {} ({}), {} left",
            format_currency(summary.total_spent),
            format_currency(summary.budget),
            format_percent(summary.spent_percent()),
            format_currency(summary.remaining_budget)
        );
        let _ = writeln!(
            out,
            "Profile: {}, household of {}, {} of {} products matched",
            condition_label(summary.health_condition),
            summary.household_size,
            summary.products_after_filter,
            summary.products_considered
        );
    }
    out
}
