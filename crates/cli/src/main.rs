//! OrderHub CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! orderhub-cli migrate
//!
//! # Seed demo accounts and a shop
//! orderhub-cli seed
//!
//! # Import a price list for a shop user
//! orderhub-cli import -f price_list.yaml -u 3
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "orderhub-cli")]
#[command(author, version, about = "OrderHub CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed demo users, tokens, and a shop
    Seed,
    /// Import a supplier price list for a shop user
    Import {
        /// Path to the YAML price list
        #[arg(short, long)]
        file: String,

        /// Id of the shop user to bind the catalog to
        #[arg(short, long)]
        user_id: i32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::Import { file, user_id } => {
            commands::import::run(&file, user_id).await?;
        }
    }
    Ok(())
}
