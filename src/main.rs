mod betting;
mod cli;
mod config;
mod investment;
mod ledger;
mod pace;
mod pipeline;
mod reconcile;
mod report;
mod retry;
mod running_style;
mod scoring;
mod scraper;
mod selection;
mod stats;
mod types;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "keiba_des=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Cli::parse();
    let config = AppConfig::load()?;

    match args.command {
        Commands::Discover { date } => cli::run_discover(&config, date).await,
        Commands::Fetch { date } => cli::run_fetch(&config, date).await,
        Commands::Score { date } => cli::run_score(&config, date),
        Commands::Select { date } => cli::run_select(&config, date),
        Commands::Run { date } => cli::run_pipeline(&config, date).await,
        Commands::Results { date } => cli::run_results(&config, date).await,
        Commands::Stats => cli::run_stats(&config),
        Commands::Ledger { action } => cli::run_ledger(&config, action),
    }
}
