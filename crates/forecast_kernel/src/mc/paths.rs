//! GBM path generation.
//!
//! Trajectories are advanced with the log-Euler update
//!
//! ```text
//! S(t+dt) = S(t) × exp((μ - ½σ²)dt + σ√dt × Z)
//! ```
//!
//! which is exact in distribution for GBM at any step size. Normals are drawn
//! one batch per time step (`n_samples` variates), so terminal-only and
//! full-path simulation consume the random source in the same order and give
//! identical terminal prices for the same seed.
//!
//! # Memory Layout
//!
//! [`PricePaths`] is row-major: `data[path_idx * (step_count + 1) + step_idx]`,
//! with `step_idx = 0` holding the initial price.

use std::f64::consts::FRAC_1_SQRT_2;

use tracing::debug;

use crate::error::{SimulationError, SimulationResult};
use crate::params::{
    validate_path_buffer, validate_sample_count, validate_step_count, LevelSpec,
    SimulationParameters,
};
use crate::rng::NormalSource;

/// Per-step constants of the log-Euler update.
#[derive(Clone, Copy, Debug)]
struct StepIncrement {
    drift_dt: f64,
    vol_sqrt_dt: f64,
}

impl StepIncrement {
    #[inline]
    fn new(params: &SimulationParameters, dt: f64) -> Self {
        Self {
            drift_dt: (params.mu - 0.5 * params.sigma * params.sigma) * dt,
            vol_sqrt_dt: params.sigma * dt.sqrt(),
        }
    }

    #[inline]
    fn growth(&self, z: f64) -> f64 {
        (self.drift_dt + self.vol_sqrt_dt * z).exp()
    }
}

/// Full simulated trajectories, `n_samples × (step_count + 1)`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricePaths {
    n_samples: usize,
    step_count: usize,
    data: Vec<f64>,
}

impl PricePaths {
    /// Returns the number of trajectories.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Returns the number of time steps per trajectory.
    #[inline]
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Returns trajectory `path_idx`, including the initial price.
    ///
    /// # Panics
    ///
    /// Panics if `path_idx >= n_samples`.
    #[inline]
    pub fn path(&self, path_idx: usize) -> &[f64] {
        let width = self.step_count + 1;
        &self.data[path_idx * width..(path_idx + 1) * width]
    }

    /// Iterates over all trajectories.
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.step_count + 1)
    }

    /// Returns the prices of every trajectory at `step_idx`.
    ///
    /// # Panics
    ///
    /// Panics if `step_idx > step_count`.
    pub fn prices_at(&self, step_idx: usize) -> Vec<f64> {
        assert!(step_idx <= self.step_count, "step index out of range");
        self.iter().map(|path| path[step_idx]).collect()
    }

    /// Returns the terminal price of every trajectory.
    pub fn terminal_prices(&self) -> Vec<f64> {
        self.prices_at(self.step_count)
    }

    /// Returns the raw row-major buffer.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// Generates independent GBM trajectories for a fixed parameter set.
///
/// The simulator is an immutable, validated view of [`SimulationParameters`];
/// all randomness is supplied per call.
///
/// # Examples
///
/// ```rust
/// use forecast_kernel::mc::PathSimulator;
/// use forecast_kernel::rng::SimRng;
/// use forecast_kernel::SimulationParameters;
///
/// let params = SimulationParameters::new(100.0, 0.05, 0.2, 1.0).unwrap();
/// let simulator = PathSimulator::new(params).unwrap();
/// let mut rng = SimRng::from_seed(42);
///
/// let terminals = simulator.terminal_prices(12, 1_000, &mut rng).unwrap();
/// assert_eq!(terminals.len(), 1_000);
/// assert!(terminals.iter().all(|&s| s > 0.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathSimulator {
    params: SimulationParameters,
}

impl PathSimulator {
    /// Creates a simulator.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `params` fails validation.
    pub fn new(params: SimulationParameters) -> SimulationResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Returns the parameters.
    #[inline]
    pub fn params(&self) -> SimulationParameters {
        self.params
    }

    /// Simulates `n_samples` trajectories of `step_count` steps and returns
    /// their terminal prices.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if `step_count` or `n_samples` is out of range;
    ///   nothing is drawn from `rng` in that case
    /// - `NumericInstability` if any terminal price is non-finite or
    ///   non-positive
    pub fn terminal_prices<R>(
        &self,
        step_count: usize,
        n_samples: usize,
        rng: &mut R,
    ) -> SimulationResult<Vec<f64>>
    where
        R: NormalSource + ?Sized,
    {
        validate_step_count(step_count)?;
        validate_sample_count(n_samples)?;

        let increment = StepIncrement::new(&self.params, self.params.horizon / step_count as f64);
        let mut prices = vec![self.params.initial_price; n_samples];
        let mut normals = vec![0.0; n_samples];

        for _ in 0..step_count {
            rng.fill_normal(&mut normals);
            for (price, &z) in prices.iter_mut().zip(normals.iter()) {
                *price *= increment.growth(z);
            }
        }

        check_prices(&prices, step_count)?;
        debug!(step_count, n_samples, "simulated terminal prices");
        Ok(prices)
    }

    /// Simulates `n_samples` full trajectories of `step_count` steps.
    ///
    /// Consumes `rng` in the same order as
    /// [`terminal_prices`](Self::terminal_prices).
    ///
    /// # Errors
    ///
    /// Same as [`terminal_prices`](Self::terminal_prices); every intermediate
    /// price is checked, not only the terminal one. Also `InvalidParameter`
    /// if the trajectories would hold more than
    /// [`MAX_PATH_VALUES`](crate::params::MAX_PATH_VALUES) prices.
    pub fn paths<R>(
        &self,
        step_count: usize,
        n_samples: usize,
        rng: &mut R,
    ) -> SimulationResult<PricePaths>
    where
        R: NormalSource + ?Sized,
    {
        validate_step_count(step_count)?;
        validate_sample_count(n_samples)?;
        validate_path_buffer(step_count, n_samples)?;

        let increment = StepIncrement::new(&self.params, self.params.horizon / step_count as f64);
        let width = step_count + 1;
        let mut data = vec![0.0; n_samples * width];
        let mut normals = vec![0.0; n_samples];

        for path in data.chunks_exact_mut(width) {
            path[0] = self.params.initial_price;
        }

        for step in 0..step_count {
            rng.fill_normal(&mut normals);
            for (path, &z) in data.chunks_exact_mut(width).zip(normals.iter()) {
                path[step + 1] = path[step] * increment.growth(z);
            }
        }

        check_prices(&data, step_count)?;
        debug!(step_count, n_samples, "simulated full paths");
        Ok(PricePaths {
            n_samples,
            step_count,
            data,
        })
    }

    /// Simulates `n_samples` fine trajectories at `level` together with coarse
    /// partners at `level - 1` driven by the same Brownian increments.
    ///
    /// Each coarse step consumes two fine normals `Z₁, Z₂` and uses
    /// `Z_c = (Z₁ + Z₂)/√2` over `2·dt`. Returns `(fine, coarse)` terminal
    /// prices, paired by index.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if `level` is 0 (there is no coarser level) or
    ///   `n_samples` is out of range
    /// - `NumericInstability` as for [`terminal_prices`](Self::terminal_prices)
    pub fn coupled_terminal_prices<R>(
        &self,
        level: LevelSpec,
        n_samples: usize,
        rng: &mut R,
    ) -> SimulationResult<(Vec<f64>, Vec<f64>)>
    where
        R: NormalSource + ?Sized,
    {
        let coarse_level = level.coarser().ok_or_else(|| {
            SimulationError::invalid("level", "coupled simulation requires level >= 1")
        })?;
        validate_sample_count(n_samples)?;

        let horizon = self.params.horizon;
        let fine_increment = StepIncrement::new(&self.params, level.dt(horizon));
        let coarse_increment = StepIncrement::new(&self.params, coarse_level.dt(horizon));

        let mut fine = vec![self.params.initial_price; n_samples];
        let mut coarse = vec![self.params.initial_price; n_samples];
        let mut z1 = vec![0.0; n_samples];
        let mut z2 = vec![0.0; n_samples];

        for _ in 0..coarse_level.step_count() {
            rng.fill_normal(&mut z1);
            rng.fill_normal(&mut z2);
            for i in 0..n_samples {
                fine[i] *= fine_increment.growth(z1[i]) * fine_increment.growth(z2[i]);
                coarse[i] *= coarse_increment.growth((z1[i] + z2[i]) * FRAC_1_SQRT_2);
            }
        }

        check_prices(&fine, level.step_count())?;
        check_prices(&coarse, coarse_level.step_count())?;
        debug!(level = level.level(), n_samples, "simulated coupled fine/coarse pairs");
        Ok((fine, coarse))
    }
}

/// Rejects the first non-finite or non-positive price.
fn check_prices(prices: &[f64], step_count: usize) -> SimulationResult<()> {
    match prices.iter().find(|&&p| !(p.is_finite() && p > 0.0)) {
        Some(&value) => Err(SimulationError::NumericInstability { step_count, value }),
        None => Ok(()),
    }
}
