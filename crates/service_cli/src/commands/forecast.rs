//! Forecast command implementation
//!
//! Plain Monte Carlo forecast of the terminal price, with a text histogram
//! of the simulated prices.

use clap::Args;
use forecast_kernel::mc::{ForecastResult, MonteCarloForecaster};
use forecast_kernel::rng::SimRng;
use forecast_kernel::SimulationParameters;
use tracing::info;

use super::{make_rng, resolve_parameters};
use crate::config::ForecastConfig;
use crate::report::{self, ForecastSummary, Histogram, OutputFormat};
use crate::Result;

/// Options of the `forecast` command. Unset options keep the configured
/// value.
#[derive(Debug, Clone, Args)]
pub struct ForecastArgs {
    /// Number of simulated paths
    #[arg(short = 'n', long)]
    pub simulations: Option<usize>,

    /// Time steps per year of horizon
    #[arg(long)]
    pub steps_per_year: Option<u32>,

    /// Random seed
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Number of histogram bins
    #[arg(short, long)]
    pub bins: Option<usize>,

    /// Do not print the histogram
    #[arg(long)]
    pub no_histogram: bool,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

impl Default for ForecastArgs {
    fn default() -> Self {
        Self {
            simulations: None,
            steps_per_year: None,
            seed: None,
            bins: None,
            no_histogram: false,
            format: "table".to_string(),
        }
    }
}

/// Run the forecast command
pub fn run(config: &ForecastConfig, args: &ForecastArgs) -> Result<()> {
    println!("{}", render(config, args)?);
    Ok(())
}

/// Render the forecast command output
pub fn render(config: &ForecastConfig, args: &ForecastArgs) -> Result<String> {
    let format: OutputFormat = args.format.parse()?;

    let mut config = config.clone();
    if let Some(n) = args.simulations {
        config.monte_carlo.n_simulations = n;
    }
    if let Some(steps) = args.steps_per_year {
        config.monte_carlo.steps_per_year = steps;
    }
    if let Some(bins) = args.bins {
        config.monte_carlo.histogram_bins = bins;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate()?;

    let params = resolve_parameters(&config)?;
    let mut rng = make_rng(config.seed);
    let show_histogram = format == OutputFormat::Table && !args.no_histogram;
    forecast_report(&config, params, &mut rng, format, show_histogram)
}

/// Runs the configured forecast.
pub(crate) fn simulate(
    config: &ForecastConfig,
    params: SimulationParameters,
    rng: &mut SimRng,
) -> Result<(ForecastSummary, ForecastResult)> {
    let mc_config = config.monte_carlo_config()?;
    info!(
        n_simulations = mc_config.n_simulations(),
        step_count = mc_config.step_count(),
        "starting Monte Carlo forecast"
    );

    let result = MonteCarloForecaster::new(mc_config).forecast(params, rng)?;
    info!(mean = result.mean, median = result.median, "forecast complete");

    let summary = ForecastSummary::new(params, mc_config.step_count(), &result);
    Ok((summary, result))
}

/// Runs the configured forecast and renders its summary, followed by the
/// histogram when `show_histogram` is set.
pub(crate) fn forecast_report(
    config: &ForecastConfig,
    params: SimulationParameters,
    rng: &mut SimRng,
    format: OutputFormat,
    show_histogram: bool,
) -> Result<String> {
    let (summary, result) = simulate(config, params, rng)?;
    let mut out = report::format_forecast(&summary, format)?;

    if show_histogram {
        if let Some(hist) =
            Histogram::from_samples(&result.samples, config.monte_carlo.histogram_bins)
        {
            out.push_str(&hist.render(result.mean, result.median, report::DEFAULT_BAR_WIDTH));
        }
    }
    Ok(out)
}
