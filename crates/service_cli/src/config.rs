//! Forecast configuration.
//!
//! Loaded from a TOML file, then overridden from the environment, then from
//! command line flags. Every section is optional; missing values fall back to
//! the primary-market scenario.
//!
//! ```toml
//! seed = 42
//! log_level = "info"
//!
//! [simulation]
//! initial_price = 8154.72
//! mu = 0.03
//! sigma = 0.15
//! horizon_years = 3.0
//!
//! [monte_carlo]
//! n_simulations = 10000
//! steps_per_year = 12
//! histogram_bins = 50
//!
//! [multilevel]
//! max_level = 4
//! samples_per_level = [10000, 5000, 2500, 1250, 625]
//! coupling = "independent"
//! parallel = false
//!
//! [price_source]
//! path = "data/Tabl_8.csv"
//! skip_rows = 4
//! delimiter = ","
//! ```

use std::path::{Path, PathBuf};

use adapter_loader::{TableOptions, DEFAULT_SKIP_ROWS};
use forecast_kernel::mc::MonteCarloConfig;
use forecast_kernel::mlmc::{Coupling, MultilevelEstimator};
use forecast_kernel::{
    ResolutionSpec, SampleAllocation, SimulationParameters, SimulationResult, MAX_LEVEL,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration error type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("IO error: {0}")]
    Io(String),
    /// The configuration file is not valid TOML for [`ForecastConfig`].
    #[error("Parse error: {0}")]
    Parse(String),
    /// An environment override could not be parsed.
    #[error("Invalid environment variable {name}: {value:?}")]
    Env {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },
    /// One or more values are out of range.
    #[error("Validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Model parameters of the forecast.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    /// Starting price per m² in PLN. Replaced by the price source when one
    /// is configured.
    pub initial_price: f64,
    /// Annual drift.
    pub mu: f64,
    /// Annual volatility.
    pub sigma: f64,
    /// Forecast horizon in years.
    pub horizon_years: f64,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            initial_price: 8154.72,
            mu: 0.03,
            sigma: 0.15,
            horizon_years: 3.0,
        }
    }
}

/// Plain Monte Carlo settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MonteCarloSection {
    /// Number of simulated paths.
    pub n_simulations: usize,
    /// Time steps per year of horizon.
    pub steps_per_year: u32,
    /// Bins of the terminal price histogram.
    pub histogram_bins: usize,
}

impl Default for MonteCarloSection {
    fn default() -> Self {
        Self {
            n_simulations: 10_000,
            steps_per_year: 12,
            histogram_bins: 50,
        }
    }
}

/// Multilevel Monte Carlo settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MultilevelSection {
    /// Finest level.
    pub max_level: u32,
    /// Samples per level, `max_level + 1` entries.
    pub samples_per_level: Vec<usize>,
    /// Sampling scheme of the level corrections.
    pub coupling: Coupling,
    /// Simulate levels on the rayon pool.
    pub parallel: bool,
}

impl Default for MultilevelSection {
    fn default() -> Self {
        Self {
            max_level: 4,
            samples_per_level: vec![10_000, 5_000, 2_500, 1_250, 625],
            coupling: Coupling::Independent,
            parallel: false,
        }
    }
}

/// Market table supplying the initial price.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceSourceSection {
    /// CSV export of the market sheet.
    pub path: PathBuf,
    /// Preamble rows above the data.
    #[serde(default = "default_skip_rows")]
    pub skip_rows: usize,
    /// Field delimiter.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_skip_rows() -> usize {
    DEFAULT_SKIP_ROWS
}

fn default_delimiter() -> char {
    ','
}

impl PriceSourceSection {
    /// CSV layout for the loader. Non-ASCII delimiters are rejected by
    /// [`ForecastConfig::validate`].
    pub fn table_options(&self) -> TableOptions {
        TableOptions {
            skip_rows: self.skip_rows,
            delimiter: u8::try_from(self.delimiter).unwrap_or(b','),
        }
    }
}

/// Forecast configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Seed of the random stream. Drawn from OS entropy when absent.
    pub seed: Option<u64>,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Model parameters.
    pub simulation: SimulationSection,
    /// Plain Monte Carlo settings.
    pub monte_carlo: MonteCarloSection,
    /// Multilevel settings.
    pub multilevel: MultilevelSection,
    /// Optional market table for the initial price.
    pub price_source: Option<PriceSourceSection>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            seed: None,
            log_level: "info".to_string(),
            simulation: SimulationSection::default(),
            monte_carlo: MonteCarloSection::default(),
            multilevel: MultilevelSection::default(),
            price_source: None,
        }
    }
}

impl ForecastConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from `path`, or the defaults if the file does not
    /// exist. A file that exists but fails to parse is an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            info!(path = %path.display(), "no configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Apply `FORECAST_SEED`, `FORECAST_INITIAL_PRICE` and
    /// `FORECAST_LOG_LEVEL`.
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        if let Ok(seed) = std::env::var("FORECAST_SEED") {
            let parsed = seed.trim().parse().map_err(|_| ConfigError::Env {
                name: "FORECAST_SEED",
                value: seed.clone(),
            })?;
            self.seed = Some(parsed);
        }

        if let Ok(price) = std::env::var("FORECAST_INITIAL_PRICE") {
            self.simulation.initial_price =
                price.trim().parse().map_err(|_| ConfigError::Env {
                    name: "FORECAST_INITIAL_PRICE",
                    value: price.clone(),
                })?;
        }

        if let Ok(log_level) = std::env::var("FORECAST_LOG_LEVEL") {
            self.log_level = log_level;
        }

        Ok(self)
    }

    /// Validate the configuration, collecting every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if !VALID_LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            errors.push(format!(
                "Invalid log_level '{}'. Valid values: {:?}",
                self.log_level, VALID_LOG_LEVELS
            ));
        }

        if let Err(e) = self.simulation_parameters() {
            errors.push(e.to_string());
        } else if let Err(e) = self.monte_carlo_config() {
            errors.push(e.to_string());
        }

        if self.monte_carlo.histogram_bins == 0 {
            errors.push("histogram_bins must be greater than 0".to_string());
        }

        if self.multilevel.max_level > MAX_LEVEL {
            errors.push(format!(
                "max_level {} exceeds maximum allowed ({})",
                self.multilevel.max_level, MAX_LEVEL
            ));
        } else if let Err(e) = self.multilevel_estimator() {
            errors.push(e.to_string());
        }

        if let Some(source) = &self.price_source {
            if source.path.as_os_str().is_empty() {
                errors.push("price_source.path cannot be empty".to_string());
            }
            if !source.delimiter.is_ascii() {
                errors.push(format!(
                    "price_source.delimiter '{}' must be an ASCII character",
                    source.delimiter
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Model parameters from `[simulation]`.
    pub fn simulation_parameters(&self) -> SimulationResult<SimulationParameters> {
        SimulationParameters::new(
            self.simulation.initial_price,
            self.simulation.mu,
            self.simulation.sigma,
            self.simulation.horizon_years,
        )
    }

    /// Plain Monte Carlo configuration from `[monte_carlo]`.
    pub fn monte_carlo_config(&self) -> SimulationResult<MonteCarloConfig> {
        let resolution = ResolutionSpec::per_year(
            self.monte_carlo.steps_per_year,
            self.simulation.horizon_years,
        )?;
        MonteCarloConfig::builder()
            .n_simulations(self.monte_carlo.n_simulations)
            .resolution(resolution)
            .build()
    }

    /// Multilevel estimator from `[multilevel]`.
    pub fn multilevel_estimator(&self) -> SimulationResult<MultilevelEstimator> {
        let allocation = SampleAllocation::new(self.multilevel.samples_per_level.clone());
        Ok(MultilevelEstimator::new(self.multilevel.max_level, allocation)?
            .with_coupling(self.multilevel.coupling))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config_validates() {
        let config = ForecastConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.monte_carlo_config().unwrap().step_count(), 36);
        assert_eq!(config.multilevel_estimator().unwrap().max_level(), 4);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ForecastConfig::from_toml(
            r#"
            seed = 7

            [simulation]
            sigma = 0.2

            [multilevel]
            coupling = "coupled"
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(7));
        assert_relative_eq!(config.simulation.sigma, 0.2);
        assert_relative_eq!(config.simulation.initial_price, 8154.72);
        assert_eq!(config.multilevel.coupling, Coupling::Coupled);
        assert_eq!(config.multilevel.samples_per_level.len(), 5);
        assert!(config.price_source.is_none());
    }

    #[test]
    fn test_price_source_defaults() {
        let config = ForecastConfig::from_toml(
            r#"
            [price_source]
            path = "data/Tabl_10.csv"
            "#,
        )
        .unwrap();

        let source = config.price_source.unwrap();
        assert_eq!(source.path, PathBuf::from("data/Tabl_10.csv"));
        assert_eq!(source.table_options(), TableOptions::default());
    }

    #[test]
    fn test_malformed_toml() {
        let err = ForecastConfig::from_toml("[simulation\nmu = 0.1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validate_collects_errors() {
        let mut config = ForecastConfig::default();
        config.log_level = "loud".to_string();
        config.simulation.sigma = -0.1;
        config.monte_carlo.histogram_bins = 0;
        config.multilevel.samples_per_level = vec![100, 50];

        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 4);
                assert!(errors[0].contains("log_level"));
                assert!(errors[1].contains("sigma"));
                assert!(errors[2].contains("histogram_bins"));
                assert!(errors[3].contains("sample_allocation"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_level_above_maximum() {
        let mut config = ForecastConfig::default();
        config.multilevel.max_level = MAX_LEVEL + 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_level"));
    }

    #[test]
    fn test_validate_non_ascii_delimiter() {
        let mut config = ForecastConfig::default();
        config.price_source = Some(PriceSourceSection {
            path: PathBuf::from("sheet.csv"),
            skip_rows: 0,
            delimiter: '§',
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("delimiter"));
    }

    #[test]
    fn test_env_override() {
        std::env::set_var("FORECAST_SEED", "123");
        std::env::set_var("FORECAST_INITIAL_PRICE", "9000.5");
        let config = ForecastConfig::default().with_env_override().unwrap();
        assert_eq!(config.seed, Some(123));
        assert_relative_eq!(config.simulation.initial_price, 9000.5);

        std::env::set_var("FORECAST_SEED", "not-a-seed");
        let err = ForecastConfig::default().with_env_override().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Env {
                name: "FORECAST_SEED",
                ..
            }
        ));

        std::env::remove_var("FORECAST_SEED");
        std::env::remove_var("FORECAST_INITIAL_PRICE");
    }
}
