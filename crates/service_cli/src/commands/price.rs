//! Price command implementation
//!
//! Loads a market table and reports its average price per m².

use std::path::PathBuf;

use adapter_loader::{MarketSegment, MarketTable, TableOptions};
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::config::ForecastConfig;
use crate::report::OutputFormat;
use crate::Result;

/// Options of the `price` command.
#[derive(Debug, Clone, Args)]
pub struct PriceArgs {
    /// Market table (CSV). Defaults to `[price_source].path`, then to the
    /// segment's sheet under `--data-dir`
    #[arg(short, long, conflicts_with = "all")]
    pub file: Option<PathBuf>,

    /// Market segment (primary, secondary)
    #[arg(long, default_value = "primary")]
    pub segment: MarketSegment,

    /// Report every segment found under `--data-dir`
    #[arg(long)]
    pub all: bool,

    /// Directory holding the exported sheets
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Preamble rows above the data
    #[arg(long)]
    pub skip_rows: Option<usize>,

    /// Output format (table, json)
    #[arg(long, default_value = "table")]
    pub format: String,
}

/// Average price of one market table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSummary {
    /// Segment of the table, when it was chosen by segment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<MarketSegment>,
    /// Table that was read.
    pub path: PathBuf,
    /// Rows kept after cleaning.
    pub rows: usize,
    /// Rows dropped during cleaning.
    pub dropped: usize,
    /// Total value in PLN.
    pub total_value_pln: f64,
    /// Total usable area in m².
    pub total_area_m2: f64,
    /// Average price per m² in PLN.
    pub average_price_per_m2: f64,
}

impl PriceSummary {
    fn load(
        segment: Option<MarketSegment>,
        path: PathBuf,
        options: TableOptions,
    ) -> Result<Self> {
        let table = MarketTable::from_path(&path, options)?;
        let summary = Self {
            segment,
            rows: table.rows().len(),
            dropped: table.dropped(),
            total_value_pln: table.total_value_pln(),
            total_area_m2: table.total_area_m2(),
            average_price_per_m2: table.average_price_per_m2()?,
            path,
        };
        info!(
            price = summary.average_price_per_m2,
            path = %summary.path.display(),
            "price source loaded"
        );
        Ok(summary)
    }

    fn to_table(&self) -> String {
        let title = match self.segment {
            Some(segment) => format!("{} market ({})", segment, self.path.display()),
            None => self.path.display().to_string(),
        };
        format!(
            "\nPrice source: {}\n\
             Rows used: {} ({} dropped)\n\
             Total value: {:.0} PLN\n\
             Total usable area: {:.0} m²\n\
             Average price per m²: {:.2} PLN\n",
            title,
            self.rows,
            self.dropped,
            self.total_value_pln,
            self.total_area_m2,
            self.average_price_per_m2
        )
    }
}

/// Run the price command
pub fn run(config: &ForecastConfig, args: &PriceArgs) -> Result<()> {
    println!("{}", render(config, args)?);
    Ok(())
}

/// Render the price command output
///
/// A single table renders as one JSON object; `--all` renders an array with
/// one entry per segment.
pub fn render(config: &ForecastConfig, args: &PriceArgs) -> Result<String> {
    let format: OutputFormat = args.format.parse()?;

    if args.all {
        let options = with_skip_rows(configured_options(config), args);
        let summaries = [MarketSegment::Primary, MarketSegment::Secondary]
            .into_iter()
            .map(|segment| PriceSummary::load(Some(segment), sheet_path(args, segment), options))
            .collect::<Result<Vec<_>>>()?;
        return match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&summaries)?),
            OutputFormat::Table => Ok(summaries.iter().map(PriceSummary::to_table).collect()),
        };
    }

    let (segment, path, options) = source_of(config, args);
    let summary = PriceSummary::load(segment, path, with_skip_rows(options, args))?;
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&summary)?),
        OutputFormat::Table => Ok(summary.to_table()),
    }
}

fn configured_options(config: &ForecastConfig) -> TableOptions {
    config
        .price_source
        .as_ref()
        .map(|s| s.table_options())
        .unwrap_or_default()
}

fn with_skip_rows(mut options: TableOptions, args: &PriceArgs) -> TableOptions {
    if let Some(skip_rows) = args.skip_rows {
        options.skip_rows = skip_rows;
    }
    options
}

fn sheet_path(args: &PriceArgs, segment: MarketSegment) -> PathBuf {
    args.data_dir.join(format!("{}.csv", segment.sheet_name()))
}

fn source_of(
    config: &ForecastConfig,
    args: &PriceArgs,
) -> (Option<MarketSegment>, PathBuf, TableOptions) {
    match (&args.file, &config.price_source) {
        (Some(file), _) => (None, file.clone(), configured_options(config)),
        (None, Some(source)) => (None, source.path.clone(), source.table_options()),
        (None, None) => (
            Some(args.segment),
            sheet_path(args, args.segment),
            TableOptions::default(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CliError;
    use std::io::Write;

    fn args() -> PriceArgs {
        PriceArgs {
            file: None,
            segment: MarketSegment::Primary,
            all: false,
            data_dir: PathBuf::from("data"),
            skip_rows: None,
            format: "table".to_string(),
        }
    }

    #[test]
    fn test_default_source_follows_segment() {
        let mut args = args();
        args.segment = MarketSegment::Secondary;
        let (segment, path, options) = source_of(&ForecastConfig::default(), &args);
        assert_eq!(segment, Some(MarketSegment::Secondary));
        assert_eq!(path, PathBuf::from("data/Tabl_10.csv"));
        assert_eq!(options.skip_rows, 4);
    }

    #[test]
    fn test_render_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Flats,100,81547.2,10000\nTotal,,,\n").unwrap();

        let args = PriceArgs {
            file: Some(file.path().to_path_buf()),
            skip_rows: Some(0),
            format: "json".to_string(),
            ..args()
        };
        let out = render(&ForecastConfig::default(), &args).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["rows"], 1);
        assert_eq!(value["dropped"], 1);
        let price = value["average_price_per_m2"].as_f64().unwrap();
        assert!((price - 8154.72).abs() < 1e-9);
    }

    #[test]
    fn test_missing_table() {
        let args = PriceArgs {
            data_dir: PathBuf::from("no/such/dir"),
            ..args()
        };
        assert!(matches!(
            render(&ForecastConfig::default(), &args),
            Err(CliError::Loader(_))
        ));
    }

    #[test]
    fn test_render_all_segments() {
        let dir = tempfile::tempdir().unwrap();
        let preamble = "title,,,\n,,,\nheader,,,\n,,,\n";
        std::fs::write(
            dir.path().join("Tabl_8.csv"),
            format!("{}Flats,100,81547.2,10000\n", preamble),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("Tabl_10.csv"),
            format!("{}Flats,300,210000,30000\nHouses,50,90000,10000\n", preamble),
        )
        .unwrap();

        let args = PriceArgs {
            all: true,
            data_dir: dir.path().to_path_buf(),
            format: "json".to_string(),
            ..args()
        };
        let out = render(&ForecastConfig::default(), &args).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["segment"], "primary");
        assert_eq!(entries[1]["segment"], "secondary");
        let secondary = entries[1]["average_price_per_m2"].as_f64().unwrap();
        assert!((secondary - 7500.0).abs() < 1e-9);

        let table = render(
            &ForecastConfig::default(),
            &PriceArgs {
                format: "table".to_string(),
                ..args
            },
        )
        .unwrap();
        assert!(table.contains("primary market"));
        assert!(table.contains("secondary market"));
    }

    #[test]
    fn test_render_all_requires_both_sheets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Tabl_8.csv"), "Flats,1,10,1\n").unwrap();
        let args = PriceArgs {
            all: true,
            data_dir: dir.path().to_path_buf(),
            skip_rows: Some(0),
            ..args()
        };
        assert!(matches!(
            render(&ForecastConfig::default(), &args),
            Err(CliError::Loader(_))
        ));
    }
}
