mod commands;
mod config;
mod main_lib;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use commands::{CartItemArg, PreferenceArgs};
use config::Config;
use main_lib::init_tracing;
use nutrikart_client::ApiClient;

#[derive(Parser)]
#[command(name = "nutrikart")]
#[command(about = "NutriKart - budget-aware grocery recommendations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List product categories
    Categories,

    /// List products, optionally for one category
    Products {
        #[arg(short, long)]
        category: Option<i64>,
    },

    /// Show one product with its nutrition facts
    Product { id: i64 },

    /// Ask for recommendations without a cart
    Recommend {
        #[command(flatten)]
        preferences: PreferenceArgs,
    },

    /// Build a cart, sync recommendations against it and export it as CSV
    Cart {
        /// Cart lines as <product_id>[:<quantity>]
        #[arg(required = true)]
        items: Vec<CartItemArg>,

        #[command(flatten)]
        preferences: PreferenceArgs,

        /// CSV output path (defaults to NUTRIKART_EXPORT_PATH)
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config.log_format, cli.verbose);
    tracing::debug!("Using backend at {}", config.client.api_url);

    let client = Arc::new(ApiClient::from_config(&config.client)?);

    match cli.command {
        Commands::Categories => commands::categories(&client).await,
        Commands::Products { category } => commands::products(&client, category).await,
        Commands::Product { id } => commands::product(&client, id).await,
        Commands::Recommend { preferences } => {
            commands::recommend(client, &config, &preferences).await
        }
        Commands::Cart {
            items,
            preferences,
            export,
        } => commands::cart(client, &config, &items, &preferences, export).await,
    }
}
