//! # Housing Forecast Service (Layer S)
//!
//! Configuration, command implementations and report rendering behind the
//! `housing-forecast` binary. The crate orchestrates the price source
//! (`adapter_loader`) and the simulation kernel (`forecast_kernel`).
//!
//! # Commands
//!
//! - `housing-forecast run` - MLMC estimate and Monte Carlo forecast
//! - `housing-forecast forecast` - Monte Carlo forecast with histogram
//! - `housing-forecast mlmc` - multilevel estimate with per-level breakdown
//! - `housing-forecast price` - average price per m² of a market table
//! - `housing-forecast check` - validate the configuration

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;

pub use config::{ConfigError, ForecastConfig};
pub use error::{CliError, Result};
