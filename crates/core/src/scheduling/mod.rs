//! Scheduling module - injectable timers and the debounce primitive.
//!
//! Timers go through the [`Scheduler`] trait so callers can swap the clock.
//! [`TokioScheduler`] uses `tokio::time`, which tests drive with the paused
//! virtual clock (`#[tokio::test(start_paused = true)]`).

mod debounce;
mod scheduler;

pub use debounce::Debouncer;
pub use scheduler::{Scheduler, TimerGate, TimerHandle, TokioScheduler};
