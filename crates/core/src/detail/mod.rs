//! Detail module - guards a single keyed detail view against stale fetches.

mod detail_guard;

pub use detail_guard::{DetailFetchGuard, DetailState, FetchTicket};
