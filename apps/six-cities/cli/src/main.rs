//! Six Cities CLI
//!
//! Maintenance commands run against the same MongoDB database as the API.

use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_offers::{MongoOfferRepository, OfferService};
use domain_users::{MongoUserRepository, UserService};
use eyre::{Result, WrapErr};
use std::path::PathBuf;
use tracing::info;

mod config;
mod importer;

use config::Config;
use importer::OfferImporter;

#[derive(Parser)]
#[command(name = "six-cities-cli")]
#[command(about = "Maintenance commands for the Six Cities API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import offers from a tab-separated file
    Import {
        /// Path to the TSV file
        file: PathBuf,

        /// Password given to authors that do not exist yet
        #[arg(short = 'p', long, env = "IMPORT_DEFAULT_PASSWORD", default_value = "six-cities")]
        default_password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config.environment);

    match cli.command {
        Commands::Import {
            file,
            default_password,
        } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .wrap_err_with(|| format!("Cannot read {}", file.display()))?;

            info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());
            let client = database::mongodb::connect_with_retry(&config.mongodb, None).await?;
            let db = client.database(config.mongodb.database());

            let offers = MongoOfferRepository::new(&db);
            offers.init_indexes().await?;
            let users = MongoUserRepository::new(&db);
            users.init_indexes().await?;

            let importer = OfferImporter::new(
                OfferService::new(offers),
                UserService::new(users, config.password.salt.as_str()),
                default_password,
            );

            info!("Importing offers from {}", file.display());
            let summary = importer.import(&content).await;
            println!(
                "Imported {} offers, {} failed",
                summary.imported, summary.failed
            );

            client.shutdown().await;
        }
    }

    Ok(())
}
