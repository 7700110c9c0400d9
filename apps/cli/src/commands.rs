use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use tracing::{debug, info};

use nutrikart_client::ApiClient;
use nutrikart_core::cart::CartStore;
use nutrikart_core::catalog::CatalogServiceTrait;
use nutrikart_core::detail::DetailFetchGuard;
use nutrikart_core::export::CartExport;
use nutrikart_core::recommendations::{
    FormInput, FormPhase, Preferences, RecommendationForm, RecommendationSyncController,
    RecommendationView,
};
use nutrikart_core::scheduling::TokioScheduler;

use crate::config::Config;
use crate::render;

/// `<product_id>[:<quantity>]` on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartItemArg {
    pub product_id: i64,
    pub quantity: u32,
}

impl FromStr for CartItemArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, quantity) = match s.split_once(':') {
            Some((id, quantity)) => (id, quantity),
            None => (s, "1"),
        };
        let product_id = id
            .trim()
            .parse()
            .map_err(|_| format!("invalid product id '{}'", id))?;
        let quantity: u32 = quantity
            .trim()
            .parse()
            .map_err(|_| format!("invalid quantity '{}'", quantity))?;
        if quantity == 0 {
            return Err("quantity must be at least 1".to_string());
        }
        Ok(Self {
            product_id,
            quantity,
        })
    }
}

/// Preference flags shared by `recommend` and `cart`. Unset flags fall back
/// to the configured preferences.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PreferenceArgs {
    /// Weekly budget in rupees
    #[arg(short, long)]
    pub budget: Option<String>,

    /// Number of people in the household (1-20)
    #[arg(long)]
    pub household: Option<String>,

    /// diabetic, hypertension, weight_loss or none
    #[arg(long)]
    pub health: Option<String>,
}

impl PreferenceArgs {
    pub fn resolve(&self, defaults: &Preferences) -> anyhow::Result<FormInput> {
        let budget = self
            .budget
            .clone()
            .unwrap_or_else(|| defaults.budget.to_string());
        let household = self
            .household
            .clone()
            .unwrap_or_else(|| defaults.household_size.to_string());
        let health = self.health.clone().unwrap_or_else(|| {
            defaults
                .health_condition
                .map(|c| c.as_str().to_string())
                .unwrap_or_default()
        });
        Ok(FormInput::parse(&budget, &health, &household)?)
    }
}

pub async fn categories(client: &ApiClient) -> anyhow::Result<()> {
    let categories = client.list_categories().await?;
    print!("{}", render::render_categories(&categories));
    Ok(())
}

pub async fn products(client: &ApiClient, category: Option<i64>) -> anyhow::Result<()> {
    let products = client.list_products(category).await?;
    print!("{}", render::render_products(&products));
    Ok(())
}

pub async fn product(client: &ApiClient, id: i64) -> anyhow::Result<()> {
    let guard = DetailFetchGuard::new();
    let loaded = guard
        .load(id, |id| async move { client.get_product(id).await })
        .await?;

    match loaded {
        Some(product) => print!("{}", render::render_product(&product)),
        None => println!("Product {} not found", id),
    }
    Ok(())
}

pub async fn recommend(
    client: Arc<ApiClient>,
    config: &Config,
    args: &PreferenceArgs,
) -> anyhow::Result<()> {
    let input = args.resolve(&config.sync.preferences)?;
    let form = RecommendationForm::new(client);

    match form.submit(input).await? {
        FormPhase::Results(response) => {
            print!(
                "{}",
                render::render_recommendations(&response.recommendations, Some(&response.summary))
            );
            Ok(())
        }
        FormPhase::Failed { message, .. } => bail!(message),
        phase => Err(anyhow!("Recommendation form ended in unexpected state {:?}", phase)),
    }
}

pub async fn cart(
    client: Arc<ApiClient>,
    config: &Config,
    items: &[CartItemArg],
    args: &PreferenceArgs,
    export: Option<PathBuf>,
) -> anyhow::Result<()> {
    let preferences = args.resolve(&config.sync.preferences)?.validate()?;

    let store = CartStore::new();
    for item in items {
        let product = client
            .get_product(item.product_id)
            .await?
            .ok_or_else(|| anyhow!("Product {} not found", item.product_id))?;
        store.add(product, item.quantity)?;
    }
    let snapshot = store.snapshot();
    print!("{}", render::render_cart(&snapshot));

    let mut sync_config = config.sync.clone();
    sync_config.preferences = preferences.clone();
    let controller = RecommendationSyncController::new(
        client.clone(),
        Arc::new(TokioScheduler),
        sync_config,
    );
    let subscription = controller.attach(&store);

    let wait = config.client.request_timeout + config.sync.debounce * 2;
    let view = tokio::time::timeout(wait, settled_view(&controller))
        .await
        .context("Timed out waiting for recommendations")??;
    controller.detach(&store, subscription);

    if let Some(error) = &view.last_error {
        println!("Recommendations unavailable: {}", error);
    } else if !snapshot.is_empty() {
        println!();
        print!(
            "{}",
            render::render_recommendations(view.recommendations(), view.summary())
        );
    }

    let path = export.unwrap_or_else(|| config.export_path.clone());
    let cart_export = CartExport::from_snapshot(&snapshot, preferences.health_condition);
    cart_export.write_to_path(&path)?;
    info!("Cart exported to {}", path.display());
    println!("Cart exported to {}", path.display());
    Ok(())
}

/// Waits until the controller has no request outstanding.
async fn settled_view(
    controller: &RecommendationSyncController,
) -> anyhow::Result<RecommendationView> {
    let mut rx = controller.subscribe();
    loop {
        {
            let view = rx.borrow_and_update();
            if !view.loading {
                return Ok(view.clone());
            }
            debug!("Waiting for recommendation generation {}", view.generation);
        }
        rx.changed()
            .await
            .context("Recommendation controller stopped")?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutrikart_core::recommendations::HealthCondition;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cart_item_parsing() {
        assert_eq!(
            "12:3".parse::<CartItemArg>().unwrap(),
            CartItemArg {
                product_id: 12,
                quantity: 3
            }
        );
        assert_eq!("7".parse::<CartItemArg>().unwrap().quantity, 1);
        assert!("7:0".parse::<CartItemArg>().is_err());
        assert!("abc:2".parse::<CartItemArg>().is_err());
        assert!("4:-1".parse::<CartItemArg>().is_err());
    }

    #[test]
    fn test_preference_args_fall_back_to_defaults() {
        let defaults = Preferences {
            budget: dec!(900),
            household_size: 3,
            health_condition: Some(HealthCondition::WeightLoss),
        };

        let input = PreferenceArgs::default().resolve(&defaults).unwrap();
        assert_eq!(input.budget, dec!(900));
        assert_eq!(input.household_size, 3);
        assert_eq!(input.health_condition, Some(HealthCondition::WeightLoss));

        let overridden = PreferenceArgs {
            budget: Some("450".to_string()),
            household: None,
            health: Some("none".to_string()),
        }
        .resolve(&defaults)
        .unwrap();
        assert_eq!(overridden.budget, dec!(450));
        assert_eq!(overridden.health_condition, None);
    }
}
