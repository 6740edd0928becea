//! Sample statistics over simulated prices.
//!
//! Inputs are finite positive prices, but their sums may still overflow, so
//! callers pass every derived value through [`ensure_finite`]. Empty input
//! yields NaN, which `ensure_finite` rejects as well.

use crate::error::{SimulationError, SimulationResult};

/// Arithmetic mean.
#[inline]
pub fn mean(samples: &[f64]) -> f64 {
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Population variance (divides by `n`).
pub fn population_variance(samples: &[f64]) -> f64 {
    let m = mean(samples);
    samples.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / samples.len() as f64
}

/// Population standard deviation.
#[inline]
pub fn population_std_dev(samples: &[f64]) -> f64 {
    population_variance(samples).sqrt()
}

/// Median; the average of the two middle values for even lengths.
pub fn median(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return f64::NAN;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        0.5 * (sorted[mid - 1] + sorted[mid])
    } else {
        sorted[mid]
    }
}

/// Rejects the first non-finite statistic.
pub fn ensure_finite(step_count: usize, values: &[f64]) -> SimulationResult<()> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(&value) => Err(SimulationError::NumericInstability { step_count, value }),
        None => Ok(()),
    }
}
