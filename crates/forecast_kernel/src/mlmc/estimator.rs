//! Telescoping-sum multilevel Monte Carlo estimator.
//!
//! ```text
//! E[S_L] = E[S_0] + Σ_{l=1}^{L} E[S_l - S_{l-1}]
//! ```
//!
//! where `S_l` is the terminal price simulated with `2^l` steps. Each term is
//! estimated from its own samples and the terms are added in level order.

use rayon::prelude::*;
use tracing::debug;

use super::report::{LevelDiagnostics, MultilevelReport};
use crate::error::SimulationResult;
use crate::mc::stats;
use crate::mc::PathSimulator;
use crate::params::{LevelSpec, SampleAllocation, SimulationParameters};
use crate::rng::{NormalSource, SimRng};

/// How fine and coarse samples of a level correction are paired.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Coupling {
    /// Fine and coarse sets are drawn independently and differenced
    /// elementwise. Unbiased, but the correction variance is the sum of both
    /// level variances.
    #[default]
    Independent,

    /// Each coarse path is built from the Brownian increments of its fine
    /// partner, so the correction variance shrinks with the level.
    Coupled,
}

/// Multilevel Monte Carlo estimator over levels `0..=max_level`.
///
/// Construction validates the allocation against `max_level`, so an invalid
/// setup fails before any simulation work.
///
/// # Examples
///
/// ```rust
/// use forecast_kernel::mlmc::MultilevelEstimator;
/// use forecast_kernel::rng::SimRng;
/// use forecast_kernel::{SampleAllocation, SimulationParameters};
///
/// let params = SimulationParameters::new(8154.72, 0.03, 0.15, 3.0).unwrap();
/// let estimator =
///     MultilevelEstimator::new(2, SampleAllocation::new(vec![4_000, 2_000, 1_000])).unwrap();
///
/// let estimate = estimator.estimate(params, &mut SimRng::from_seed(42)).unwrap();
/// assert!(estimate.is_finite());
///
/// // Allocation length must be max_level + 1.
/// assert!(MultilevelEstimator::new(3, SampleAllocation::new(vec![100, 50])).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MultilevelEstimator {
    max_level: u32,
    allocation: SampleAllocation,
    coupling: Coupling,
}

impl MultilevelEstimator {
    /// Creates an estimator with [`Coupling::Independent`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `max_level > MAX_LEVEL`, the allocation
    /// length differs from `max_level + 1`, or any entry is zero.
    pub fn new(max_level: u32, allocation: SampleAllocation) -> SimulationResult<Self> {
        allocation.validate_for(max_level)?;
        Ok(Self {
            max_level,
            allocation,
            coupling: Coupling::Independent,
        })
    }

    /// Selects the pairing of fine and coarse samples.
    #[inline]
    pub fn with_coupling(mut self, coupling: Coupling) -> Self {
        self.coupling = coupling;
        self
    }

    /// Returns the finest level.
    #[inline]
    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Returns the per-level sample counts.
    #[inline]
    pub fn allocation(&self) -> &SampleAllocation {
        &self.allocation
    }

    /// Returns the coupling mode.
    #[inline]
    pub fn coupling(&self) -> Coupling {
        self.coupling
    }

    /// Estimates `E[S(T)]` at the finest level.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `params` is invalid (before any draw);
    /// `NumericInstability` from any level's simulation, or if a level's mean
    /// or variance or the summed estimate is not finite.
    pub fn estimate<R>(&self, params: SimulationParameters, rng: &mut R) -> SimulationResult<f64>
    where
        R: NormalSource + ?Sized,
    {
        self.estimate_with_diagnostics(params, rng)
            .map(|report| report.estimate)
    }

    /// Estimates `E[S(T)]` and returns the per-level breakdown.
    ///
    /// Levels are simulated sequentially from the single stream `rng`.
    ///
    /// # Errors
    ///
    /// Same as [`estimate`](Self::estimate).
    pub fn estimate_with_diagnostics<R>(
        &self,
        params: SimulationParameters,
        rng: &mut R,
    ) -> SimulationResult<MultilevelReport>
    where
        R: NormalSource + ?Sized,
    {
        let simulator = PathSimulator::new(params)?;
        let levels = self
            .level_specs()?
            .into_iter()
            .map(|(spec, n_samples)| {
                simulate_level(&simulator, spec, n_samples, self.coupling, &mut *rng)
            })
            .collect::<SimulationResult<Vec<_>>>()?;
        self.finish(levels)
    }

    /// Estimates `E[S(T)]` with levels simulated concurrently.
    ///
    /// One child stream per level is forked from `rng` before any work
    /// starts, and contributions are summed in level order, so a fixed seed
    /// gives the same report regardless of thread scheduling. The result
    /// differs from [`estimate_with_diagnostics`](Self::estimate_with_diagnostics)
    /// for the same seed because the draws are split differently.
    ///
    /// # Errors
    ///
    /// Same as [`estimate`](Self::estimate); if several levels fail, the
    /// error of the lowest failing level is returned.
    pub fn estimate_parallel(
        &self,
        params: SimulationParameters,
        rng: &mut SimRng,
    ) -> SimulationResult<MultilevelReport> {
        let simulator = PathSimulator::new(params)?;
        let jobs: Vec<(LevelSpec, usize, SimRng)> = self
            .level_specs()?
            .into_iter()
            .map(|(spec, n_samples)| (spec, n_samples, rng.fork()))
            .collect();

        let outcomes: Vec<SimulationResult<LevelDiagnostics>> = jobs
            .into_par_iter()
            .map(|(spec, n_samples, mut stream)| {
                simulate_level(&simulator, spec, n_samples, self.coupling, &mut stream)
            })
            .collect();

        let levels = outcomes.into_iter().collect::<SimulationResult<Vec<_>>>()?;
        self.finish(levels)
    }

    fn level_specs(&self) -> SimulationResult<Vec<(LevelSpec, usize)>> {
        (0..=self.max_level)
            .zip(self.allocation.counts().iter().copied())
            .map(|(level, n_samples)| Ok((LevelSpec::new(level)?, n_samples)))
            .collect()
    }

    /// Sums the levels; an estimate that overflows is reported at the
    /// finest step count.
    fn finish(&self, levels: Vec<LevelDiagnostics>) -> SimulationResult<MultilevelReport> {
        let report = MultilevelReport::from_levels(levels);
        let finest = report.levels.last().map_or(1, |level| level.step_count);
        stats::ensure_finite(finest, &[report.estimate])?;
        debug!(
            max_level = self.max_level,
            coupling = ?self.coupling,
            estimate = report.estimate,
            std_error = report.std_error(),
            "multilevel estimate complete"
        );
        Ok(report)
    }
}

/// Simulates one term of the telescoping sum.
fn simulate_level<R>(
    simulator: &PathSimulator,
    spec: LevelSpec,
    n_samples: usize,
    coupling: Coupling,
    rng: &mut R,
) -> SimulationResult<LevelDiagnostics>
where
    R: NormalSource + ?Sized,
{
    let corrections = match (spec.coarser(), coupling) {
        (None, _) => simulator.terminal_prices(spec.step_count(), n_samples, rng)?,
        (Some(coarse), Coupling::Independent) => {
            let fine = simulator.terminal_prices(spec.step_count(), n_samples, rng)?;
            let coarse = simulator.terminal_prices(coarse.step_count(), n_samples, rng)?;
            differences(&fine, &coarse)
        }
        (Some(_), Coupling::Coupled) => {
            let (fine, coarse) = simulator.coupled_terminal_prices(spec, n_samples, rng)?;
            differences(&fine, &coarse)
        }
    };

    let contribution = stats::mean(&corrections);
    let variance = stats::population_variance(&corrections);
    stats::ensure_finite(spec.step_count(), &[contribution, variance])?;

    let diagnostics = LevelDiagnostics {
        level: spec.level(),
        step_count: spec.step_count(),
        n_samples,
        contribution,
        variance,
    };
    debug!(
        level = diagnostics.level,
        step_count = diagnostics.step_count,
        n_samples,
        contribution = diagnostics.contribution,
        variance = diagnostics.variance,
        "level simulated"
    );
    Ok(diagnostics)
}

#[inline]
fn differences(fine: &[f64], coarse: &[f64]) -> Vec<f64> {
    fine.iter().zip(coarse.iter()).map(|(f, c)| f - c).collect()
}

/// Runs a one-off independent-coupling estimate.
///
/// # Errors
///
/// `InvalidParameter` if the allocation does not match `max_level` or the
/// parameters are invalid, raised before any draw; `NumericInstability` from
/// the simulator.
pub fn estimate<R>(
    max_level: u32,
    allocation: &SampleAllocation,
    params: SimulationParameters,
    rng: &mut R,
) -> SimulationResult<f64>
where
    R: NormalSource + ?Sized,
{
    MultilevelEstimator::new(max_level, allocation.clone())?.estimate(params, rng)
}
