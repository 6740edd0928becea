//! Monte Carlo forecast configuration.

use crate::error::{SimulationError, SimulationResult};
use crate::params::{validate_sample_count, ResolutionSpec};

/// Plain Monte Carlo forecast configuration.
///
/// Immutable; use [`MonteCarloConfigBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use forecast_kernel::mc::MonteCarloConfig;
/// use forecast_kernel::ResolutionSpec;
///
/// let config = MonteCarloConfig::builder()
///     .n_simulations(10_000)
///     .resolution(ResolutionSpec::monthly(3.0).unwrap())
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.n_simulations(), 10_000);
/// assert_eq!(config.step_count(), 36);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonteCarloConfig {
    n_simulations: usize,
    resolution: ResolutionSpec,
}

impl MonteCarloConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> MonteCarloConfigBuilder {
        MonteCarloConfigBuilder::default()
    }

    /// Returns the number of simulated trajectories.
    #[inline]
    pub fn n_simulations(&self) -> usize {
        self.n_simulations
    }

    /// Returns the time discretisation.
    #[inline]
    pub fn resolution(&self) -> ResolutionSpec {
        self.resolution
    }

    /// Returns the number of steps per trajectory.
    #[inline]
    pub fn step_count(&self) -> usize {
        self.resolution.step_count()
    }
}

/// Builder for [`MonteCarloConfig`].
#[derive(Clone, Debug, Default)]
pub struct MonteCarloConfigBuilder {
    n_simulations: Option<usize>,
    step_count: Option<usize>,
}

impl MonteCarloConfigBuilder {
    /// Sets the number of trajectories, in `[1, MAX_SAMPLES]`.
    #[inline]
    pub fn n_simulations(mut self, n_simulations: usize) -> Self {
        self.n_simulations = Some(n_simulations);
        self
    }

    /// Sets an explicit step count, in `[1, MAX_STEPS]`.
    #[inline]
    pub fn step_count(mut self, step_count: usize) -> Self {
        self.step_count = Some(step_count);
        self
    }

    /// Sets the step count from a resolution spec.
    #[inline]
    pub fn resolution(mut self, resolution: ResolutionSpec) -> Self {
        self.step_count = Some(resolution.step_count());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if a field is missing or out of range.
    pub fn build(self) -> SimulationResult<MonteCarloConfig> {
        let n_simulations = self
            .n_simulations
            .ok_or_else(|| SimulationError::invalid("n_simulations", "must be specified"))?;
        let step_count = self
            .step_count
            .ok_or_else(|| SimulationError::invalid("step_count", "must be specified"))?;

        validate_sample_count(n_simulations)?;
        let resolution = ResolutionSpec::new(step_count)?;

        Ok(MonteCarloConfig {
            n_simulations,
            resolution,
        })
    }
}
