//! Per-level diagnostics of a multilevel estimate.

/// Outcome of one level of the telescoping sum.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelDiagnostics {
    /// Level index.
    pub level: u32,
    /// Fine step count, `2^level`.
    pub step_count: usize,
    /// Samples drawn at this level (per resolution).
    pub n_samples: usize,
    /// Mean of the level correction (plain mean at level 0).
    pub contribution: f64,
    /// Population variance of the per-sample correction.
    pub variance: f64,
}

impl LevelDiagnostics {
    /// Variance of this level's contribution, `variance / n_samples`.
    #[inline]
    pub fn estimator_variance(&self) -> f64 {
        self.variance / self.n_samples as f64
    }
}

/// A multilevel estimate with its level breakdown.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultilevelReport {
    /// Sum of level contributions, accumulated in level order.
    pub estimate: f64,
    /// One entry per level, ordered from level 0.
    pub levels: Vec<LevelDiagnostics>,
}

impl MultilevelReport {
    /// Sums contributions in increasing level order.
    pub(crate) fn from_levels(levels: Vec<LevelDiagnostics>) -> Self {
        let estimate = levels.iter().fold(0.0, |acc, level| acc + level.contribution);
        Self { estimate, levels }
    }

    /// Standard error of the estimate, treating levels as independent.
    pub fn std_error(&self) -> f64 {
        self.levels
            .iter()
            .map(LevelDiagnostics::estimator_variance)
            .sum::<f64>()
            .sqrt()
    }

    /// Total number of simulated trajectories across all levels and
    /// resolutions.
    pub fn total_paths(&self) -> usize {
        self.levels
            .iter()
            .map(|l| if l.level == 0 { l.n_samples } else { 2 * l.n_samples })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn level(level: u32, n_samples: usize, contribution: f64, variance: f64) -> LevelDiagnostics {
        LevelDiagnostics {
            level,
            step_count: 1 << level,
            n_samples,
            contribution,
            variance,
        }
    }

    #[test]
    fn test_report_sums_in_order() {
        let report = MultilevelReport::from_levels(vec![
            level(0, 100, 1000.0, 400.0),
            level(1, 50, 2.5, 100.0),
            level(2, 25, -1.0, 25.0),
        ]);
        assert_relative_eq!(report.estimate, 1001.5);
        assert_relative_eq!(report.std_error(), (4.0_f64 + 2.0 + 1.0).sqrt());
        assert_eq!(report.total_paths(), 100 + 100 + 50);
    }
}
