//! CLI command implementations
//!
//! Each submodule implements a specific CLI command. Commands render their
//! output to a `String`; `run` prints it.

pub mod check;
pub mod forecast;
pub mod mlmc;
pub mod price;
pub mod run;

use adapter_loader::load_average_price;
use forecast_kernel::rng::SimRng;
use forecast_kernel::SimulationParameters;
use tracing::info;

use crate::config::ForecastConfig;
use crate::Result;

/// Model parameters of `config`, with the initial price read from the
/// market table when `[price_source]` is set.
pub(crate) fn resolve_parameters(config: &ForecastConfig) -> Result<SimulationParameters> {
    let mut params = config.simulation_parameters()?;
    if let Some(source) = &config.price_source {
        params.initial_price = load_average_price(&source.path, source.table_options())?;
        params.validate()?;
        info!(
            initial_price = params.initial_price,
            path = %source.path.display(),
            "initial price taken from market table"
        );
    }
    Ok(params)
}

/// Seeded stream when a seed is configured, OS entropy otherwise. The seed
/// is logged either way so a run can be replayed.
pub(crate) fn make_rng(seed: Option<u64>) -> SimRng {
    let rng = match seed {
        Some(seed) => SimRng::from_seed(seed),
        None => SimRng::from_entropy(),
    };
    info!(seed = rng.seed(), "random stream initialised");
    rng
}
