//! Result presentation: tables, JSON and the terminal price histogram.

use forecast_kernel::mc::ForecastResult;
use forecast_kernel::mlmc::{Coupling, MultilevelReport};
use forecast_kernel::SimulationParameters;
use serde::Serialize;

use crate::{CliError, Result};

/// Width of the longest histogram bar, in characters.
pub const DEFAULT_BAR_WIDTH: usize = 60;

/// Output format of the reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(CliError::InvalidArgument(format!(
                "Unknown format: {}. Supported: json, table",
                other
            ))),
        }
    }
}

/// Summary of a plain Monte Carlo forecast. The raw samples stay out of the
/// report; they feed the histogram only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    /// Model parameters.
    pub parameters: SimulationParameters,
    /// Number of simulated paths.
    pub n_simulations: usize,
    /// Time steps per path.
    pub step_count: usize,
    /// Sample mean of the terminal price.
    pub mean: f64,
    /// Sample median of the terminal price.
    pub median: f64,
    /// Population standard deviation of the terminal price.
    pub std_dev: f64,
    /// Standard error of the mean.
    pub std_error: f64,
    /// Half-width of the 95% confidence interval of the mean.
    pub confidence_95: f64,
}

impl ForecastSummary {
    /// Summarises a forecast run.
    pub fn new(
        parameters: SimulationParameters,
        step_count: usize,
        result: &ForecastResult,
    ) -> Self {
        Self {
            parameters,
            n_simulations: result.n_samples(),
            step_count,
            mean: result.mean,
            median: result.median,
            std_dev: result.std_dev,
            std_error: result.std_error(),
            confidence_95: result.confidence_95(),
        }
    }
}

/// Multilevel estimate with the settings that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultilevelSummary {
    /// Model parameters.
    pub parameters: SimulationParameters,
    /// Sampling scheme of the level corrections.
    pub coupling: Coupling,
    /// Standard error of the estimate.
    pub std_error: f64,
    /// Estimate and per-level diagnostics.
    pub report: MultilevelReport,
}

impl MultilevelSummary {
    /// Wraps a multilevel report.
    pub fn new(
        parameters: SimulationParameters,
        coupling: Coupling,
        report: MultilevelReport,
    ) -> Self {
        Self {
            parameters,
            coupling,
            std_error: report.std_error(),
            report,
        }
    }
}

/// Renders a forecast summary.
pub fn format_forecast(summary: &ForecastSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(summary)?),
        OutputFormat::Table => {
            let mut out = String::new();
            out.push_str("\nMonte Carlo forecast\n");
            push_separator(&mut out);
            push_parameters(&mut out, &summary.parameters);
            push_row(&mut out, "Simulations", summary.n_simulations.to_string());
            push_row(&mut out, "Time steps", summary.step_count.to_string());
            push_separator(&mut out);
            push_row(&mut out, "Mean [PLN/m²]", format!("{:.2}", summary.mean));
            push_row(&mut out, "Median [PLN/m²]", format!("{:.2}", summary.median));
            push_row(&mut out, "Std dev [PLN/m²]", format!("{:.2}", summary.std_dev));
            push_row(
                &mut out,
                "95% CI of mean",
                format!("± {:.2}", summary.confidence_95),
            );
            push_separator(&mut out);
            Ok(out)
        }
    }
}

/// Renders a multilevel summary.
pub fn format_multilevel(summary: &MultilevelSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(summary)?),
        OutputFormat::Table => {
            let mut out = String::new();
            out.push_str(&format!(
                "\nMLMC estimated average price in {} years: {:.2} PLN/m²\n",
                summary.parameters.horizon, summary.report.estimate
            ));
            push_separator(&mut out);
            push_parameters(&mut out, &summary.parameters);
            push_row(
                &mut out,
                "Coupling",
                match summary.coupling {
                    Coupling::Independent => "independent".to_string(),
                    Coupling::Coupled => "coupled".to_string(),
                },
            );
            push_row(&mut out, "Std error", format!("{:.2}", summary.std_error));
            push_separator(&mut out);
            out.push_str(&format!(
                "{:>5} {:>8} {:>9} {:>14} {:>16}\n",
                "Level", "Steps", "Samples", "Contribution", "Variance"
            ));
            for level in &summary.report.levels {
                out.push_str(&format!(
                    "{:>5} {:>8} {:>9} {:>14.4} {:>16.4}\n",
                    level.level, level.step_count, level.n_samples, level.contribution, level.variance
                ));
            }
            push_separator(&mut out);
            Ok(out)
        }
    }
}

fn push_separator(out: &mut String) {
    out.push_str(&"─".repeat(56));
    out.push('\n');
}

fn push_row(out: &mut String, label: &str, value: String) {
    out.push_str(&format!("{:<24}{:>32}\n", label, value));
}

fn push_parameters(out: &mut String, params: &SimulationParameters) {
    push_row(out, "Initial price [PLN/m²]", format!("{:.2}", params.initial_price));
    push_row(out, "Drift (μ)", format!("{:.4}", params.mu));
    push_row(out, "Volatility (σ)", format!("{:.4}", params.sigma));
    push_row(out, "Horizon [years]", format!("{}", params.horizon));
}

/// Equal-width histogram of terminal prices.
///
/// Bins span `[min, max]` of the samples; the last bin is closed on the
/// right. A degenerate sample set (all values equal) gets the range
/// `[x - 0.5, x + 0.5]`.
///
/// # Examples
///
/// ```rust
/// use service_cli::report::Histogram;
///
/// let hist = Histogram::from_samples(&[1.0, 2.0, 2.5, 4.0], 3).unwrap();
/// assert_eq!(hist.counts(), &[1, 2, 1]);
/// assert_eq!(hist.bin_index(4.0), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    lower: f64,
    upper: f64,
    bin_width: f64,
    counts: Vec<usize>,
}

impl Histogram {
    /// Bins `samples` into `bins` equal-width bins.
    ///
    /// Returns `None` if there are no samples, no bins, or a sample is not
    /// finite.
    pub fn from_samples(samples: &[f64], bins: usize) -> Option<Self> {
        if samples.is_empty() || bins == 0 || samples.iter().any(|x| !x.is_finite()) {
            return None;
        }

        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (lower, upper) = if max > min {
            (min, max)
        } else {
            (min - 0.5, max + 0.5)
        };

        let mut hist = Self {
            lower,
            upper,
            bin_width: (upper - lower) / bins as f64,
            counts: vec![0; bins],
        };
        for &x in samples {
            if let Some(idx) = hist.bin_index(x) {
                hist.counts[idx] += 1;
            }
        }
        Some(hist)
    }

    /// Returns the per-bin counts.
    #[inline]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Returns the lower and upper edge of bin `idx`.
    pub fn bin_edges(&self, idx: usize) -> (f64, f64) {
        let lo = self.lower + idx as f64 * self.bin_width;
        (lo, lo + self.bin_width)
    }

    /// Returns the bin containing `value`, or `None` outside the range.
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        if !(value >= self.lower && value <= self.upper) {
            return None;
        }
        let idx = ((value - self.lower) / self.bin_width).floor() as usize;
        Some(idx.min(self.counts.len() - 1))
    }

    /// Renders one line per bin with a bar scaled to `bar_width` and markers
    /// on the bins holding `mean` and `median`.
    pub fn render(&self, mean: f64, median: f64, bar_width: usize) -> String {
        let max_count = self.counts.iter().copied().max().unwrap_or(0).max(1);
        let mean_bin = self.bin_index(mean);
        let median_bin = self.bin_index(median);

        let mut out = String::new();
        out.push_str("\nMonte Carlo Simulation\n");
        out.push_str("Terminal price per m² [PLN] vs number of scenarios\n");
        for (idx, &count) in self.counts.iter().enumerate() {
            let (lo, hi) = self.bin_edges(idx);
            let bar = "█".repeat(count * bar_width / max_count);
            let marker = match (mean_bin == Some(idx), median_bin == Some(idx)) {
                (true, true) => " ◀ mean, median",
                (true, false) => " ◀ mean",
                (false, true) => " ◀ median",
                (false, false) => "",
            };
            out.push_str(&format!(
                "{:>10.2} – {:>10.2} │{:<width$} {:>6}{}\n",
                lo,
                hi,
                bar,
                count,
                marker,
                width = bar_width
            ));
        }
        out.push_str(&format!("Mean: {:.2} PLN/m²   Median: {:.2} PLN/m²\n", mean, median));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use forecast_kernel::mlmc::LevelDiagnostics;

    fn params() -> SimulationParameters {
        SimulationParameters::new(8154.72, 0.03, 0.15, 3.0).unwrap()
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("TABLE".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!(matches!(
            "csv".parse::<OutputFormat>(),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_histogram_counts_every_sample() {
        let samples: Vec<f64> = (0..1000).map(|i| 8000.0 + i as f64).collect();
        let hist = Histogram::from_samples(&samples, 50).unwrap();
        assert_eq!(hist.counts().len(), 50);
        assert_eq!(hist.counts().iter().sum::<usize>(), 1000);
        assert_eq!(hist.bin_index(8999.0), Some(49));
        assert_eq!(hist.bin_index(8000.0), Some(0));
        assert_eq!(hist.bin_index(7999.0), None);
    }

    #[test]
    fn test_histogram_degenerate_samples() {
        let hist = Histogram::from_samples(&[5.0; 10], 4).unwrap();
        let (lo, _) = hist.bin_edges(0);
        let (_, hi) = hist.bin_edges(3);
        assert_relative_eq!(lo, 4.5);
        assert_relative_eq!(hi, 5.5);
        assert_eq!(hist.counts().iter().sum::<usize>(), 10);
    }

    #[test]
    fn test_histogram_rejects_empty_input() {
        assert!(Histogram::from_samples(&[], 10).is_none());
        assert!(Histogram::from_samples(&[1.0], 0).is_none());
        assert!(Histogram::from_samples(&[1.0, f64::NAN], 10).is_none());
    }

    #[test]
    fn test_histogram_render_markers() {
        let hist = Histogram::from_samples(&[1.0, 2.0, 2.0, 3.0, 10.0], 3).unwrap();
        let text = hist.render(3.6, 2.0, 10);
        let lines: Vec<&str> = text.lines().filter(|l| l.contains('│')).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("◀ mean, median"));
        assert!(!lines[1].contains('◀'));
        assert!(lines[0].contains(&"█".repeat(10)));
    }

    #[test]
    fn test_forecast_json() {
        let result = ForecastResult {
            samples: vec![1.0, 2.0, 3.0],
            mean: 2.0,
            median: 2.0,
            std_dev: 0.5,
        };
        let summary = ForecastSummary::new(params(), 36, &result);
        let json = format_forecast(&summary, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["n_simulations"], 3);
        assert_eq!(value["step_count"], 36);
        assert_eq!(value["parameters"]["initial_price"], 8154.72);
        assert!(value.get("samples").is_none());
    }

    #[test]
    fn test_multilevel_table() {
        let report = MultilevelReport {
            estimate: 8923.2,
            levels: vec![LevelDiagnostics {
                level: 0,
                step_count: 1,
                n_samples: 100,
                contribution: 8923.2,
                variance: 1.0e6,
            }],
        };
        let summary = MultilevelSummary::new(params(), Coupling::Independent, report);
        let table = format_multilevel(&summary, OutputFormat::Table).unwrap();
        assert!(table.contains("MLMC estimated average price in 3 years: 8923.20 PLN/m²"));
        assert!(table.contains("independent"));
        assert_relative_eq!(summary.std_error, 100.0);
    }
}
