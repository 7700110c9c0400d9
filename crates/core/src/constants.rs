/// Debounce window for recommendation requests, in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 400;

/// Budget used before the user picks one
pub const DEFAULT_BUDGET: i64 = 500;

/// Household size used before the user picks one
pub const DEFAULT_HOUSEHOLD_SIZE: u32 = 2;

/// Largest household accepted by the standalone form
pub const MAX_HOUSEHOLD_SIZE: u32 = 20;

/// Currency symbol used for display
pub const CURRENCY_SYMBOL: &str = "₹";
