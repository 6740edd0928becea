//! Plain Monte Carlo forecast of the terminal price distribution.
//!
//! The forecaster runs the path simulator once at a fixed resolution and
//! summarises the terminal prices. It never formats or renders anything;
//! report and histogram output live with the caller.

use tracing::debug;

use super::config::MonteCarloConfig;
use super::paths::{PathSimulator, PricePaths};
use super::stats;
use crate::error::SimulationResult;
use crate::params::SimulationParameters;
use crate::rng::NormalSource;

/// Terminal price samples with their summary statistics.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForecastResult {
    /// Simulated terminal prices, in draw order.
    pub samples: Vec<f64>,
    /// Sample mean.
    pub mean: f64,
    /// Sample median.
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl ForecastResult {
    /// Summarises a non-empty set of terminal prices.
    ///
    /// # Errors
    ///
    /// Returns `NumericInstability` if the mean, median or standard deviation
    /// is not finite.
    pub(crate) fn from_samples(samples: Vec<f64>, step_count: usize) -> SimulationResult<Self> {
        let mean = stats::mean(&samples);
        let median = stats::median(&samples);
        let std_dev = stats::population_std_dev(&samples);
        stats::ensure_finite(step_count, &[mean, median, std_dev])?;
        Ok(Self {
            samples,
            mean,
            median,
            std_dev,
        })
    }

    /// Returns the number of samples.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    /// Returns the standard error of the mean.
    #[inline]
    pub fn std_error(&self) -> f64 {
        self.std_dev / (self.samples.len() as f64).sqrt()
    }

    /// Returns the 95% confidence interval half-width of the mean.
    #[inline]
    pub fn confidence_95(&self) -> f64 {
        1.96 * self.std_error()
    }
}

/// Monte Carlo forecaster.
///
/// # Examples
///
/// ```rust
/// use forecast_kernel::mc::{MonteCarloConfig, MonteCarloForecaster};
/// use forecast_kernel::rng::SimRng;
/// use forecast_kernel::{ResolutionSpec, SimulationParameters};
///
/// let params = SimulationParameters::new(8154.72, 0.03, 0.15, 3.0).unwrap();
/// let config = MonteCarloConfig::builder()
///     .n_simulations(2_000)
///     .resolution(ResolutionSpec::monthly(params.horizon).unwrap())
///     .build()
///     .unwrap();
///
/// let forecaster = MonteCarloForecaster::new(config);
/// let result = forecaster.forecast(params, &mut SimRng::from_seed(42)).unwrap();
///
/// assert_eq!(result.n_samples(), 2_000);
/// assert!(result.std_dev > 0.0);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct MonteCarloForecaster {
    config: MonteCarloConfig,
}

impl MonteCarloForecaster {
    /// Creates a forecaster from a validated configuration.
    #[inline]
    pub fn new(config: MonteCarloConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Simulates terminal prices and summarises them.
    ///
    /// # Errors
    ///
    /// Propagates `InvalidParameter` and `NumericInstability` from the path
    /// simulator unchanged; `NumericInstability` also if a summary statistic
    /// overflows.
    pub fn forecast<R>(
        &self,
        params: SimulationParameters,
        rng: &mut R,
    ) -> SimulationResult<ForecastResult>
    where
        R: NormalSource + ?Sized,
    {
        let simulator = PathSimulator::new(params)?;
        let samples = simulator.terminal_prices(
            self.config.step_count(),
            self.config.n_simulations(),
            rng,
        )?;
        let result = ForecastResult::from_samples(samples, self.config.step_count())?;
        debug!(
            n_simulations = self.config.n_simulations(),
            step_count = self.config.step_count(),
            mean = result.mean,
            median = result.median,
            std_dev = result.std_dev,
            "forecast complete"
        );
        Ok(result)
    }

    /// Like [`forecast`](Self::forecast) but also returns the full
    /// trajectories for display.
    ///
    /// Draws from `rng` in the same order as `forecast`, so both give the same
    /// statistics for the same seed.
    ///
    /// # Errors
    ///
    /// Same as [`forecast`](Self::forecast).
    pub fn forecast_with_paths<R>(
        &self,
        params: SimulationParameters,
        rng: &mut R,
    ) -> SimulationResult<(ForecastResult, PricePaths)>
    where
        R: NormalSource + ?Sized,
    {
        let simulator = PathSimulator::new(params)?;
        let paths = simulator.paths(
            self.config.step_count(),
            self.config.n_simulations(),
            rng,
        )?;
        let result = ForecastResult::from_samples(paths.terminal_prices(), paths.step_count())?;
        Ok((result, paths))
    }
}

/// Runs a one-off forecast of `n_simulations` trajectories at `step_count`
/// steps.
///
/// # Errors
///
/// `InvalidParameter` for out-of-range counts or parameters, before any draw;
/// `NumericInstability` from the simulator.
pub fn forecast<R>(
    n_simulations: usize,
    step_count: usize,
    params: SimulationParameters,
    rng: &mut R,
) -> SimulationResult<ForecastResult>
where
    R: NormalSource + ?Sized,
{
    let config = MonteCarloConfig::builder()
        .n_simulations(n_simulations)
        .step_count(step_count)
        .build()?;
    MonteCarloForecaster::new(config).forecast(params, rng)
}
