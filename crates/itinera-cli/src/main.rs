mod images;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "itinera-cli")]
#[command(about = "Find and store photographs for itinerary activities")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search images for a single place and print them as JSON
    Search {
        /// Activity or place name
        #[arg(long)]
        name: String,
        /// Surrounding city or region
        #[arg(long)]
        locality: Option<String>,
    },
    /// Search and store images for every activity of a generated itinerary
    Illustrate {
        #[arg(long)]
        plan_id: Uuid,
        /// Path to the itinerary JSON file
        #[arg(long)]
        itinerary: PathBuf,
    },
    /// List stored images for one activity of a plan
    Images {
        #[arg(long)]
        plan_id: Uuid,
        #[arg(long)]
        activity: String,
    },
}

/// Load `.env` once, then read configuration from the process environment.
fn load_config() -> anyhow::Result<itinera_core::AppConfig> {
    dotenvy::dotenv().ok();
    Ok(itinera_core::load_app_config_from_env()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Search { name, locality }) => {
            images::run_search(&config, &name, locality.as_deref()).await?;
        }
        Some(Commands::Illustrate { plan_id, itinerary }) => {
            images::run_illustrate(&config, plan_id, &itinerary).await?;
        }
        Some(Commands::Images { plan_id, activity }) => {
            images::run_list_images(&config, plan_id, &activity).await?;
        }
        None => println!("itinera-cli: use --help to list commands"),
    }

    Ok(())
}
