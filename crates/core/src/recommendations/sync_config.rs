use std::time::Duration;

use crate::constants::DEFAULT_DEBOUNCE_MS;
use crate::recommendations::recommendations_model::Preferences;

/// Tuning for [`RecommendationSyncController`](super::RecommendationSyncController).
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Quiet period before a recommendation request is dispatched.
    pub debounce: Duration,
    /// Preferences in effect before the user changes anything.
    pub preferences: Preferences,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            preferences: Preferences::default(),
        }
    }
}
