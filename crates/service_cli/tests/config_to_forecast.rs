//! Integration tests: configuration file through to rendered reports.

use std::io::Write;

use service_cli::commands::{forecast, mlmc, run};
use service_cli::report::OutputFormat;
use service_cli::{CliError, ForecastConfig};
use tempfile::{NamedTempFile, TempDir};

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write file");
    path
}

#[test]
fn test_config_with_price_source() {
    let dir = tempfile::tempdir().expect("temp dir");
    let sheet = write(
        &dir,
        "Tabl_10.csv",
        "title;;;\n;;;\nheader;;;\n;;;\nFlats;300;210 000;30 000\nHouses;50;90 000;10 000\n",
    );
    let config_path = write(
        &dir,
        "forecast.toml",
        &format!(
            r#"
seed = 11

[monte_carlo]
n_simulations = 2000
histogram_bins = 20

[multilevel]
max_level = 2
samples_per_level = [2000, 1000, 500]

[price_source]
path = "{}"
delimiter = ";"
"#,
            sheet.display()
        ),
    );

    let config = ForecastConfig::load(&config_path).unwrap();
    config.validate().unwrap();

    let args = forecast::ForecastArgs {
        format: "json".to_string(),
        ..forecast::ForecastArgs::default()
    };
    let out = forecast::render(&config, &args).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["parameters"]["initial_price"], 7500.0);
    assert_eq!(value["n_simulations"], 2000);

    let mean = value["mean"].as_f64().unwrap();
    let expected = 7500.0 * (0.03f64 * 3.0).exp();
    assert!((mean - expected).abs() / expected < 0.05, "mean {}", mean);
}

#[test]
fn test_seeded_runs_match() {
    let mut config = ForecastConfig::default();
    config.seed = Some(2024);
    config.monte_carlo.n_simulations = 1_000;
    config.multilevel.max_level = 1;
    config.multilevel.samples_per_level = vec![1_000, 500];

    let args = run::RunArgs {
        seed: None,
        format: "json".to_string(),
    };
    assert_eq!(
        run::render(&config, &args).unwrap(),
        run::render(&config, &args).unwrap()
    );
}

#[test]
fn test_missing_config_uses_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = ForecastConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, ForecastConfig::default());
}

#[test]
fn test_malformed_config_is_an_error() {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(b"[monte_carlo]\nn_simulations = \"many\"\n")
        .expect("write config");
    assert!(ForecastConfig::load_or_default(file.path()).is_err());
}

#[test]
fn test_unknown_format_rejected() {
    let args = mlmc::MlmcArgs {
        format: "xml".to_string(),
        ..mlmc::MlmcArgs::default()
    };
    assert!(matches!(
        mlmc::render(&ForecastConfig::default(), &args),
        Err(CliError::InvalidArgument(_))
    ));
    assert_eq!("Json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
}
