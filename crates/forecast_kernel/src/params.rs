//! Simulation inputs: GBM parameters, discretisation specs and per-level
//! sample allocations.
//!
//! All types here are immutable values. They are validated when constructed
//! (or by an explicit `validate` call) and passed by value or shared
//! reference into every simulation call; nothing in the kernel holds them
//! across calls.

use crate::error::{SimulationError, SimulationResult};

/// Maximum number of samples per simulation call.
pub const MAX_SAMPLES: usize = 10_000_000;

/// Highest supported multilevel index.
pub const MAX_LEVEL: u32 = 20;

/// Maximum number of time steps per trajectory (`2^MAX_LEVEL`).
pub const MAX_STEPS: usize = 1 << MAX_LEVEL;

/// Maximum number of stored prices, `n_samples × (step_count + 1)`, in one
/// full-path simulation (2 GiB of `f64`).
pub const MAX_PATH_VALUES: usize = 1 << 28;

/// Parameters of the Geometric Brownian Motion driving the price index.
///
/// # Model
///
/// ```text
/// dS = μ S dt + σ S dW,   S(0) = initial_price
/// ```
///
/// # Examples
///
/// ```rust
/// use forecast_kernel::SimulationParameters;
///
/// let params = SimulationParameters::new(8154.72, 0.03, 0.15, 3.0).unwrap();
/// assert!((params.expected_terminal_price() - 8922.68).abs() < 0.01);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationParameters {
    /// Initial price per unit area (S₀).
    pub initial_price: f64,
    /// Annualised drift (μ).
    pub mu: f64,
    /// Annualised volatility (σ).
    pub sigma: f64,
    /// Forecast horizon (T) in years.
    pub horizon: f64,
}

impl SimulationParameters {
    /// Creates and validates a parameter set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if any field violates the ranges documented
    /// on [`validate`](Self::validate).
    pub fn new(initial_price: f64, mu: f64, sigma: f64, horizon: f64) -> SimulationResult<Self> {
        let params = Self {
            initial_price,
            mu,
            sigma,
            horizon,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// - `initial_price` must be finite and > 0
    /// - `mu` must be finite
    /// - `sigma` must be finite and ≥ 0
    /// - `horizon` must be finite and > 0
    pub fn validate(&self) -> SimulationResult<()> {
        if !(self.initial_price.is_finite() && self.initial_price > 0.0) {
            return Err(SimulationError::invalid(
                "initial_price",
                format!("must be finite and positive, got {}", self.initial_price),
            ));
        }
        if !self.mu.is_finite() {
            return Err(SimulationError::invalid(
                "mu",
                format!("must be finite, got {}", self.mu),
            ));
        }
        if !(self.sigma.is_finite() && self.sigma >= 0.0) {
            return Err(SimulationError::invalid(
                "sigma",
                format!("must be finite and non-negative, got {}", self.sigma),
            ));
        }
        if !(self.horizon.is_finite() && self.horizon > 0.0) {
            return Err(SimulationError::invalid(
                "horizon",
                format!("must be finite and positive, got {}", self.horizon),
            ));
        }
        Ok(())
    }

    /// Returns `E[S(T)] = S₀ · exp(μT)`.
    #[inline]
    pub fn expected_terminal_price(&self) -> f64 {
        self.initial_price * (self.mu * self.horizon).exp()
    }

    /// Returns the median of `S(T)`, `S₀ · exp((μ - ½σ²)T)`.
    #[inline]
    pub fn median_terminal_price(&self) -> f64 {
        self.initial_price * ((self.mu - 0.5 * self.sigma * self.sigma) * self.horizon).exp()
    }
}

/// One level of the multilevel hierarchy: `2^level` steps over the horizon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelSpec {
    level: u32,
}

impl LevelSpec {
    /// Creates a level spec.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `level > MAX_LEVEL`.
    pub fn new(level: u32) -> SimulationResult<Self> {
        if level > MAX_LEVEL {
            return Err(SimulationError::invalid(
                "level",
                format!("must be at most {}, got {}", MAX_LEVEL, level),
            ));
        }
        Ok(Self { level })
    }

    /// Returns the level index.
    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Returns `2^level`.
    #[inline]
    pub fn step_count(&self) -> usize {
        1usize << self.level
    }

    /// Returns the step size `horizon / 2^level`.
    #[inline]
    pub fn dt(&self, horizon: f64) -> f64 {
        horizon / self.step_count() as f64
    }

    /// Returns the next coarser level, or `None` at level 0.
    #[inline]
    pub fn coarser(&self) -> Option<Self> {
        self.level.checked_sub(1).map(|level| Self { level })
    }
}

/// A directly chosen discretisation, used by the plain Monte Carlo forecaster.
///
/// # Examples
///
/// ```rust
/// use forecast_kernel::ResolutionSpec;
///
/// // Monthly steps over three years.
/// let resolution = ResolutionSpec::monthly(3.0).unwrap();
/// assert_eq!(resolution.step_count(), 36);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolutionSpec {
    step_count: usize,
}

impl ResolutionSpec {
    /// Creates a resolution with an explicit step count.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `step_count` is outside `[1, MAX_STEPS]`.
    pub fn new(step_count: usize) -> SimulationResult<Self> {
        validate_step_count(step_count)?;
        Ok(Self { step_count })
    }

    /// `steps_per_year · horizon` steps, rounded to the nearest integer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the horizon is not positive or the
    /// rounded step count falls outside `[1, MAX_STEPS]`.
    pub fn per_year(steps_per_year: u32, horizon: f64) -> SimulationResult<Self> {
        if !(horizon.is_finite() && horizon > 0.0) {
            return Err(SimulationError::invalid(
                "horizon",
                format!("must be finite and positive, got {}", horizon),
            ));
        }
        let steps = (f64::from(steps_per_year) * horizon).round();
        if steps < 1.0 || steps > MAX_STEPS as f64 {
            return Err(SimulationError::invalid(
                "step_count",
                format!("must be in range [1, {}], got {}", MAX_STEPS, steps),
            ));
        }
        Self::new(steps as usize)
    }

    /// Twelve steps per year.
    #[inline]
    pub fn monthly(horizon: f64) -> SimulationResult<Self> {
        Self::per_year(12, horizon)
    }

    /// Returns the step count.
    #[inline]
    pub fn step_count(&self) -> usize {
        self.step_count
    }
}

/// Per-level sample counts for the multilevel estimator.
///
/// Entry `l` is the number of samples drawn at level `l`. The length must be
/// `max_level + 1`; that is checked against a given `max_level` by
/// [`validate_for`](Self::validate_for), not at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SampleAllocation {
    counts: Vec<usize>,
}

impl SampleAllocation {
    /// Wraps per-level sample counts.
    pub fn new(counts: Vec<usize>) -> Self {
        Self { counts }
    }

    /// Halves the sample count at every level, starting from `base`, for
    /// levels `0..=max_level`. Each entry is at least 1.
    ///
    /// `geometric(10_000, 4)` gives `[10000, 5000, 2500, 1250, 625]`.
    pub fn geometric(base: usize, max_level: u32) -> Self {
        let counts = (0..=max_level)
            .map(|level| (base >> level.min(usize::BITS - 1)).max(1))
            .collect();
        Self { counts }
    }

    /// Returns the per-level counts.
    #[inline]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Returns the number of levels covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns `true` if no level is covered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Returns the total number of samples across levels.
    pub fn total_samples(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Checks the allocation against `max_level`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `max_level > MAX_LEVEL`, the length is not
    /// `max_level + 1`, or any entry is outside `[1, MAX_SAMPLES]`.
    pub fn validate_for(&self, max_level: u32) -> SimulationResult<()> {
        LevelSpec::new(max_level)?;
        let expected = max_level as usize + 1;
        if self.counts.len() != expected {
            return Err(SimulationError::invalid(
                "sample_allocation",
                format!(
                    "length must equal max_level + 1 = {}, got {}",
                    expected,
                    self.counts.len()
                ),
            ));
        }
        for &count in &self.counts {
            validate_sample_count(count)?;
        }
        Ok(())
    }
}

impl From<Vec<usize>> for SampleAllocation {
    fn from(counts: Vec<usize>) -> Self {
        Self::new(counts)
    }
}

/// Checks `1 <= step_count <= MAX_STEPS`.
pub(crate) fn validate_step_count(step_count: usize) -> SimulationResult<()> {
    if step_count == 0 || step_count > MAX_STEPS {
        return Err(SimulationError::invalid(
            "step_count",
            format!("must be in range [1, {}], got {}", MAX_STEPS, step_count),
        ));
    }
    Ok(())
}

/// Checks `1 <= n_samples <= MAX_SAMPLES`.
pub(crate) fn validate_sample_count(n_samples: usize) -> SimulationResult<()> {
    if n_samples == 0 || n_samples > MAX_SAMPLES {
        return Err(SimulationError::invalid(
            "n_samples",
            format!("must be in range [1, {}], got {}", MAX_SAMPLES, n_samples),
        ));
    }
    Ok(())
}

/// Checks that `n_samples` full trajectories of `step_count` steps fit in
/// `MAX_PATH_VALUES` stored prices.
pub(crate) fn validate_path_buffer(step_count: usize, n_samples: usize) -> SimulationResult<()> {
    let values = step_count
        .checked_add(1)
        .and_then(|width| width.checked_mul(n_samples));
    match values {
        Some(values) if values <= MAX_PATH_VALUES => Ok(()),
        _ => Err(SimulationError::invalid(
            "n_samples",
            format!(
                "{} paths of {} steps exceed the limit of {} stored prices",
                n_samples, step_count, MAX_PATH_VALUES
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_path_buffer_limit() {
        assert!(validate_path_buffer(36, 10_000).is_ok());
        assert!(validate_path_buffer(MAX_PATH_VALUES - 1, 1).is_ok());
        assert!(validate_path_buffer(MAX_PATH_VALUES, 1).is_err());
        assert!(validate_path_buffer(MAX_STEPS, MAX_SAMPLES).is_err());
        assert!(validate_path_buffer(usize::MAX, 2).is_err());
        assert!(validate_path_buffer(usize::MAX - 1, usize::MAX).is_err());
    }

    #[test]
    fn test_parameters_valid() {
        let params = SimulationParameters::new(8154.72, 0.03, 0.15, 3.0).unwrap();
        assert_relative_eq!(
            params.expected_terminal_price(),
            8154.72 * 0.09_f64.exp(),
            epsilon = 1e-9
        );
        assert!(params.median_terminal_price() < params.expected_terminal_price());
    }

    #[test]
    fn test_parameters_zero_sigma_allowed() {
        assert!(SimulationParameters::new(100.0, 0.05, 0.0, 1.0).is_ok());
        assert!(SimulationParameters::new(100.0, -0.05, 0.2, 1.0).is_ok());
    }

    #[test]
    fn test_parameters_invalid() {
        let cases = [
            (0.0, 0.03, 0.15, 3.0, "initial_price"),
            (-1.0, 0.03, 0.15, 3.0, "initial_price"),
            (f64::NAN, 0.03, 0.15, 3.0, "initial_price"),
            (100.0, f64::INFINITY, 0.15, 3.0, "mu"),
            (100.0, 0.03, -0.15, 3.0, "sigma"),
            (100.0, 0.03, f64::NAN, 3.0, "sigma"),
            (100.0, 0.03, 0.15, 0.0, "horizon"),
            (100.0, 0.03, 0.15, -3.0, "horizon"),
        ];
        for (s0, mu, sigma, t, field) in cases {
            match SimulationParameters::new(s0, mu, sigma, t) {
                Err(SimulationError::InvalidParameter { name, .. }) => assert_eq!(name, field),
                other => panic!("expected InvalidParameter for {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_level_spec_steps() {
        for level in 0..=10 {
            let spec = LevelSpec::new(level).unwrap();
            assert_eq!(spec.step_count(), 1usize << level);
            assert_relative_eq!(spec.dt(3.0) * spec.step_count() as f64, 3.0, epsilon = 1e-12);
        }
        assert_eq!(LevelSpec::new(0).unwrap().coarser(), None);
        assert_eq!(
            LevelSpec::new(4).unwrap().coarser(),
            Some(LevelSpec::new(3).unwrap())
        );
        assert!(LevelSpec::new(MAX_LEVEL + 1).is_err());
    }

    #[test]
    fn test_resolution_monthly() {
        assert_eq!(ResolutionSpec::monthly(3.0).unwrap().step_count(), 36);
        assert_eq!(ResolutionSpec::monthly(0.5).unwrap().step_count(), 6);
        assert_eq!(ResolutionSpec::per_year(252, 1.0).unwrap().step_count(), 252);
        assert!(ResolutionSpec::monthly(0.01).is_err());
        assert!(ResolutionSpec::new(0).is_err());
    }

    #[test]
    fn test_allocation_geometric() {
        let allocation = SampleAllocation::geometric(10_000, 4);
        assert_eq!(allocation.counts(), &[10_000, 5_000, 2_500, 1_250, 625]);
        assert_eq!(allocation.total_samples(), 19_375);
        assert!(allocation.validate_for(4).is_ok());
        assert_eq!(SampleAllocation::geometric(2, 3).counts(), &[2, 1, 1, 1]);
    }

    #[test]
    fn test_allocation_length_mismatch() {
        let allocation = SampleAllocation::new(vec![100, 50, 25]);
        assert!(allocation.validate_for(3).is_err());
        assert!(allocation.validate_for(1).is_err());
        assert!(allocation.validate_for(2).is_ok());
    }

    #[test]
    fn test_allocation_zero_entry() {
        let allocation = SampleAllocation::new(vec![100, 0]);
        let err = allocation.validate_for(1).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::InvalidParameter {
                name: "n_samples",
                ..
            }
        ));
    }
}
