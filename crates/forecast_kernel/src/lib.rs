//! # Forecast Kernel (Layer P: Simulation Engine)
//!
//! Stochastic simulation core of the housing price forecast. The price index
//! per unit area is modelled as a Geometric Brownian Motion and its expected
//! value at a fixed horizon is estimated two ways:
//!
//! - [`mc`]: plain Monte Carlo at a fixed resolution, returning the terminal
//!   price distribution with mean, median and standard deviation
//! - [`mlmc`]: multilevel Monte Carlo over `2^l`-step resolutions, combined by
//!   a telescoping sum into a single estimate
//!
//! Both sit on the same [`PathSimulator`](mc::PathSimulator) and receive their
//! randomness through the [`NormalSource`](rng::NormalSource) capability.
//!
//! ## Layer Boundaries
//!
//! The kernel takes a validated [`SimulationParameters`] value and returns
//! plain data. It owns no file format, console output or plotting: the
//! initial price comes from `adapter_loader`, and reports are rendered by
//! `service_cli`.
//!
//! ## Usage Example
//!
//! ```rust
//! use forecast_kernel::mlmc::MultilevelEstimator;
//! use forecast_kernel::rng::SimRng;
//! use forecast_kernel::{SampleAllocation, SimulationParameters};
//!
//! let params = SimulationParameters::new(8154.72, 0.03, 0.15, 3.0).unwrap();
//! let allocation = SampleAllocation::new(vec![10_000, 5_000, 2_500, 1_250, 625]);
//! let estimator = MultilevelEstimator::new(4, allocation).unwrap();
//!
//! let mut rng = SimRng::from_seed(42);
//! let estimate = estimator.estimate(params, &mut rng).unwrap();
//! assert!(estimate.is_finite());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for parameters and results

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod error;
pub mod mc;
pub mod mlmc;
pub mod params;
pub mod rng;

pub use error::{SimulationError, SimulationResult};
pub use mc::{ForecastResult, MonteCarloConfig, MonteCarloForecaster, PathSimulator, PricePaths};
pub use mlmc::{Coupling, MultilevelEstimator, MultilevelReport};
pub use params::{
    LevelSpec, ResolutionSpec, SampleAllocation, SimulationParameters, MAX_LEVEL,
    MAX_PATH_VALUES, MAX_SAMPLES, MAX_STEPS,
};
