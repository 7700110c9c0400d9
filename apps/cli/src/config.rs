use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};
use rust_decimal::Decimal;

use nutrikart_client::ClientConfig;
use nutrikart_core::constants::MAX_HOUSEHOLD_SIZE;
use nutrikart_core::recommendations::{HealthCondition, Preferences, SyncConfig};

const DEFAULT_EXPORT_PATH: &str = "nutrikart-cart.csv";

pub struct Config {
    pub client: ClientConfig,
    pub sync: SyncConfig,
    pub export_path: PathBuf,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let client = ClientConfig::from_lookup(&lookup)?;

        let defaults = SyncConfig::default();
        let debounce = match lookup("NUTRIKART_DEBOUNCE_MS") {
            Some(raw) => Duration::from_millis(
                raw.trim()
                    .parse()
                    .with_context(|| format!("Invalid NUTRIKART_DEBOUNCE_MS '{}'", raw))?,
            ),
            None => defaults.debounce,
        };

        let mut preferences = Preferences::default();
        if let Some(raw) = lookup("NUTRIKART_BUDGET") {
            let budget: Decimal = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid NUTRIKART_BUDGET '{}'", raw))?;
            if budget <= Decimal::ZERO {
                return Err(anyhow!("NUTRIKART_BUDGET must be greater than 0"));
            }
            preferences.budget = budget;
        }
        if let Some(raw) = lookup("NUTRIKART_HOUSEHOLD_SIZE") {
            let size: u32 = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid NUTRIKART_HOUSEHOLD_SIZE '{}'", raw))?;
            if size == 0 || size > MAX_HOUSEHOLD_SIZE {
                return Err(anyhow!(
                    "NUTRIKART_HOUSEHOLD_SIZE must be between 1 and {}",
                    MAX_HOUSEHOLD_SIZE
                ));
            }
            preferences.household_size = size;
        }
        if let Some(raw) = lookup("NUTRIKART_HEALTH_CONDITION") {
            preferences.health_condition = HealthCondition::parse_filter(&raw)?;
        }

        let export_path = lookup("NUTRIKART_EXPORT_PATH")
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EXPORT_PATH.to_string())
            .into();
        let log_format = lookup("NUTRIKART_LOG_FORMAT").unwrap_or_else(|| "text".to_string());

        Ok(Self {
            client,
            sync: SyncConfig {
                debounce,
                preferences,
            },
            export_path,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<&str, &str> = pairs.iter().copied().collect();
        Config::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.sync.debounce, Duration::from_millis(400));
        assert_eq!(config.sync.preferences, Preferences::default());
        assert_eq!(config.export_path, PathBuf::from("nutrikart-cart.csv"));
        assert_eq!(config.log_format, "text");
    }

    #[test]
    fn test_preference_overrides() {
        let config = config_from(&[
            ("NUTRIKART_DEBOUNCE_MS", "150"),
            ("NUTRIKART_BUDGET", "1200.50"),
            ("NUTRIKART_HOUSEHOLD_SIZE", "4"),
            ("NUTRIKART_HEALTH_CONDITION", "hypertension"),
        ])
        .unwrap();

        assert_eq!(config.sync.debounce, Duration::from_millis(150));
        assert_eq!(config.sync.preferences.budget, dec!(1200.50));
        assert_eq!(config.sync.preferences.household_size, 4);
        assert_eq!(
            config.sync.preferences.health_condition,
            Some(HealthCondition::Hypertension)
        );
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(config_from(&[("NUTRIKART_BUDGET", "-1")]).is_err());
        assert!(config_from(&[("NUTRIKART_HOUSEHOLD_SIZE", "21")]).is_err());
        assert!(config_from(&[("NUTRIKART_HEALTH_CONDITION", "keto")]).is_err());
        assert!(config_from(&[("NUTRIKART_DEBOUNCE_MS", "fast")]).is_err());
    }
}
