//! Display formatting helpers.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::CURRENCY_SYMBOL;

/// Formats an amount in whole rupees, e.g. `₹1,250`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}{}", sign, CURRENCY_SYMBOL, group_thousands(&digits))
}

/// Percentage with one decimal place, e.g. `48.5%`.
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", value.round_dp(1).normalize())
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
