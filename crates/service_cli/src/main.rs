//! Housing Forecast CLI
//!
//! Operational entry point: forecasts the average price per m² of dwellings
//! under geometric Brownian motion, by plain and multilevel Monte Carlo.
//!
//! Configuration is read from `--config` (TOML, optional), then overridden by
//! `FORECAST_*` environment variables and finally by command flags. Logs go
//! to stderr from the start; `RUST_LOG` and `--verbose` take precedence over
//! the configured level.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use service_cli::commands::{
    self, forecast::ForecastArgs, mlmc::MlmcArgs, price::PriceArgs, run::RunArgs,
};
use service_cli::{logging, ForecastConfig};

/// Housing price forecast by Monte Carlo simulation
#[derive(Parser)]
#[command(name = "housing-forecast")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "forecast.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the multilevel estimate and the Monte Carlo forecast
    Run(RunArgs),

    /// Monte Carlo forecast of the terminal price distribution
    Forecast(ForecastArgs),

    /// Multilevel Monte Carlo estimate of the expected terminal price
    Mlmc(MlmcArgs),

    /// Average price per m² of a market table
    Price(PriceArgs),

    /// Validate the configuration
    Check,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log = logging::init(cli.verbose);

    let config = ForecastConfig::load_or_default(&cli.config)
        .and_then(ForecastConfig::with_env_override)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    config.validate().context("invalid configuration")?;
    log.apply_config_level(&config.log_level);

    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Run(args) => commands::run::run(&config, &args)?,
        Commands::Forecast(args) => commands::forecast::run(&config, &args)?,
        Commands::Mlmc(args) => commands::mlmc::run(&config, &args)?,
        Commands::Price(args) => commands::price::run(&config, &args)?,
        Commands::Check => commands::check::run(&config)?,
    }
    Ok(())
}
