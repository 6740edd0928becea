//! MLMC command implementation
//!
//! Multilevel Monte Carlo estimate of the expected terminal price.

use clap::Args;
use forecast_kernel::mlmc::{Coupling, MultilevelReport};
use forecast_kernel::rng::SimRng;
use forecast_kernel::{SampleAllocation, SimulationParameters};
use tracing::info;

use super::{make_rng, resolve_parameters};
use crate::config::ForecastConfig;
use crate::report::{self, MultilevelSummary, OutputFormat};
use crate::Result;

/// Options of the `mlmc` command. Unset options keep the configured value.
#[derive(Debug, Clone, Args)]
pub struct MlmcArgs {
    /// Finest level; levels use 2^l time steps
    #[arg(short = 'l', long)]
    pub max_level: Option<u32>,

    /// Samples per level, comma separated (max_level + 1 entries)
    #[arg(long, value_delimiter = ',')]
    pub samples: Option<Vec<usize>>,

    /// Pair fine and coarse paths through shared Brownian increments
    #[arg(long)]
    pub coupled: bool,

    /// Simulate levels in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Random seed
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

impl Default for MlmcArgs {
    fn default() -> Self {
        Self {
            max_level: None,
            samples: None,
            coupled: false,
            parallel: false,
            seed: None,
            format: "table".to_string(),
        }
    }
}

/// Run the mlmc command
pub fn run(config: &ForecastConfig, args: &MlmcArgs) -> Result<()> {
    println!("{}", render(config, args)?);
    Ok(())
}

/// Render the mlmc command output
pub fn render(config: &ForecastConfig, args: &MlmcArgs) -> Result<String> {
    let format: OutputFormat = args.format.parse()?;
    let config = apply_overrides(config, args);
    config.validate()?;
    let params = resolve_parameters(&config)?;
    let mut rng = make_rng(config.seed);
    multilevel_report(&config, params, &mut rng, format)
}

/// A `--max-level` without `--samples` halves the configured level-0 count
/// per level.
fn apply_overrides(config: &ForecastConfig, args: &MlmcArgs) -> ForecastConfig {
    let mut config = config.clone();
    let multilevel = &mut config.multilevel;

    match (&args.samples, args.max_level) {
        (Some(samples), max_level) => {
            multilevel.samples_per_level = samples.clone();
            let implied = u32::try_from(samples.len().saturating_sub(1)).unwrap_or(u32::MAX);
            multilevel.max_level = max_level.unwrap_or(implied);
        }
        (None, Some(max_level)) if max_level != multilevel.max_level => {
            let base = multilevel
                .samples_per_level
                .first()
                .copied()
                .unwrap_or(10_000);
            multilevel.samples_per_level =
                SampleAllocation::geometric(base, max_level).counts().to_vec();
            multilevel.max_level = max_level;
        }
        (None, _) => {}
    }

    if args.coupled {
        multilevel.coupling = Coupling::Coupled;
    }
    if args.parallel {
        multilevel.parallel = true;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config
}

/// Runs the configured multilevel estimator and renders its report.
pub(crate) fn multilevel_report(
    config: &ForecastConfig,
    params: SimulationParameters,
    rng: &mut SimRng,
    format: OutputFormat,
) -> Result<String> {
    let summary = estimate(config, params, rng)?;
    report::format_multilevel(&summary, format)
}

pub(crate) fn estimate(
    config: &ForecastConfig,
    params: SimulationParameters,
    rng: &mut SimRng,
) -> Result<MultilevelSummary> {
    let estimator = config.multilevel_estimator()?;
    info!(
        max_level = estimator.max_level(),
        total_samples = estimator.allocation().total_samples(),
        coupling = ?estimator.coupling(),
        parallel = config.multilevel.parallel,
        "starting multilevel estimate"
    );

    let report: MultilevelReport = if config.multilevel.parallel {
        estimator.estimate_parallel(params, rng)?
    } else {
        estimator.estimate_with_diagnostics(params, rng)?
    };
    info!(estimate = report.estimate, "multilevel estimate complete");

    Ok(MultilevelSummary::new(params, estimator.coupling(), report))
}
