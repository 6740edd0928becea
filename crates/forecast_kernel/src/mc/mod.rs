//! Monte Carlo path simulation and forecasting.
//!
//! # Architecture
//!
//! ```text
//! MonteCarloForecaster
//! ├── MonteCarloConfig  (sample count, resolution)
//! ├── PathSimulator     (log-Euler GBM trajectories)
//! ├── NormalSource      (injected random capability)
//! └── stats             (mean, median, standard deviation)
//! ```
//!
//! # Example
//!
//! ```rust
//! use forecast_kernel::mc::{MonteCarloConfig, MonteCarloForecaster};
//! use forecast_kernel::rng::SimRng;
//! use forecast_kernel::{ResolutionSpec, SimulationParameters};
//!
//! let params = SimulationParameters::new(8154.72, 0.03, 0.15, 3.0).unwrap();
//! let config = MonteCarloConfig::builder()
//!     .n_simulations(10_000)
//!     .resolution(ResolutionSpec::monthly(params.horizon).unwrap())
//!     .build()
//!     .unwrap();
//!
//! let result = MonteCarloForecaster::new(config)
//!     .forecast(params, &mut SimRng::from_seed(42))
//!     .unwrap();
//! println!("mean {:.2}, median {:.2}", result.mean, result.median);
//! ```

pub mod config;
pub mod forecaster;
pub mod paths;
pub(crate) mod stats;

pub use config::{MonteCarloConfig, MonteCarloConfigBuilder};
pub use forecaster::{forecast, ForecastResult, MonteCarloForecaster};
pub use paths::{PathSimulator, PricePaths};
