//! Check command implementation
//!
//! Validates the configuration and prints the resolved settings.

use tracing::info;

use crate::config::ForecastConfig;
use crate::Result;

/// Run the check command
pub fn run(config: &ForecastConfig) -> Result<()> {
    println!("{}", render(config)?);
    Ok(())
}

/// Render the resolved configuration
pub fn render(config: &ForecastConfig) -> Result<String> {
    config.validate()?;
    let params = config.simulation_parameters()?;
    let mc_config = config.monte_carlo_config()?;
    let estimator = config.multilevel_estimator()?;
    info!("configuration is valid");

    let mut out = String::from("\nConfiguration OK\n");
    out.push_str(&format!(
        "  GBM: S0 = {:.2}, mu = {}, sigma = {}, T = {} years\n",
        params.initial_price, params.mu, params.sigma, params.horizon
    ));
    out.push_str(&format!(
        "  Expected terminal price: {:.2} (median {:.2})\n",
        params.expected_terminal_price(),
        params.median_terminal_price()
    ));
    out.push_str(&format!(
        "  Monte Carlo: {} paths x {} steps, {} histogram bins\n",
        mc_config.n_simulations(),
        mc_config.step_count(),
        config.monte_carlo.histogram_bins
    ));
    out.push_str(&format!(
        "  MLMC: levels 0..={}, samples {:?}, {:?} coupling{}\n",
        estimator.max_level(),
        estimator.allocation().counts(),
        estimator.coupling(),
        if config.multilevel.parallel { ", parallel" } else { "" }
    ));
    out.push_str(&match config.seed {
        Some(seed) => format!("  Seed: {}\n", seed),
        None => "  Seed: from entropy\n".to_string(),
    });
    if let Some(source) = &config.price_source {
        out.push_str(&format!(
            "  Price source: {} (skip {} rows)\n",
            source.path.display(),
            source.skip_rows
        ));
    }
    Ok(out)
}
