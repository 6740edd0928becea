//! Run command implementation
//!
//! Full forecast: the multilevel estimate, then the plain Monte Carlo
//! forecast with its histogram, both on one random stream.

use clap::Args;
use serde::Serialize;

use super::forecast::{forecast_report, simulate};
use super::mlmc::estimate;
use super::{make_rng, resolve_parameters};
use crate::config::ForecastConfig;
use crate::report::{self, ForecastSummary, MultilevelSummary, OutputFormat};
use crate::Result;

/// Options of the `run` command.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Random seed
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

#[derive(Serialize)]
struct RunSummary<'a> {
    multilevel: &'a MultilevelSummary,
    monte_carlo: &'a ForecastSummary,
}

/// Run the full forecast
pub fn run(config: &ForecastConfig, args: &RunArgs) -> Result<()> {
    println!("{}", render(config, args)?);
    Ok(())
}

/// Render the full forecast output
pub fn render(config: &ForecastConfig, args: &RunArgs) -> Result<String> {
    let format: OutputFormat = args.format.parse()?;
    let mut config = config.clone();
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate()?;

    let params = resolve_parameters(&config)?;
    let mut rng = make_rng(config.seed);

    let multilevel = estimate(&config, params, &mut rng)?;

    match format {
        OutputFormat::Table => {
            let mut out = report::format_multilevel(&multilevel, format)?;
            out.push_str(&forecast_report(&config, params, &mut rng, format, true)?);
            Ok(out)
        }
        OutputFormat::Json => {
            let (monte_carlo, _) = simulate(&config, params, &mut rng)?;
            Ok(serde_json::to_string_pretty(&RunSummary {
                multilevel: &multilevel,
                monte_carlo: &monte_carlo,
            })?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ForecastConfig {
        let mut config = ForecastConfig::default();
        config.monte_carlo.n_simulations = 1_000;
        config.multilevel.max_level = 2;
        config.multilevel.samples_per_level = vec![1_000, 500, 250];
        config
    }

    #[test]
    fn test_run_table() {
        let args = RunArgs {
            seed: Some(42),
            format: "table".to_string(),
        };
        let out = render(&small_config(), &args).unwrap();
        assert!(out.contains("MLMC estimated average price"));
        assert!(out.contains("Monte Carlo forecast"));
        assert_eq!(out.lines().filter(|l| l.contains('│')).count(), 50);
    }

    #[test]
    fn test_run_json() {
        let args = RunArgs {
            seed: Some(42),
            format: "json".to_string(),
        };
        let out = render(&small_config(), &args).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value["multilevel"]["report"]["estimate"].as_f64().unwrap() > 0.0);
        assert_eq!(value["monte_carlo"]["n_simulations"], 1_000);
    }
}
