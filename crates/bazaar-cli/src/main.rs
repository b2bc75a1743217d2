mod catalog;
mod collections;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::catalog::CatalogCommands;
use crate::collections::{CartCommands, WishlistCommands};

#[derive(Debug, Parser)]
#[command(name = "bazaar-cli")]
#[command(about = "Bazaar cart, wishlist and catalog command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Inspect and edit the cart
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },
    /// Inspect and edit the wishlist
    Wishlist {
        #[command(subcommand)]
        command: WishlistCommands,
    },
    /// Browse the marketplace catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bazaar_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Cart { command } => collections::run_cart(&config, command).await,
        Commands::Wishlist { command } => collections::run_wishlist(&config, command).await,
        Commands::Catalog { command } => catalog::run_catalog(&config, command).await,
    }
}
