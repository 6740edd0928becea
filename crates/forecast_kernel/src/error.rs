//! Error types for the simulation kernel.
//!
//! Every fallible kernel operation returns [`SimulationError`]. Parameter
//! checks run before any random draw; numeric checks run after the
//! simulation and before any statistic is derived from the samples.

use thiserror::Error;

/// Categorised simulation errors.
///
/// # Variants
/// - `InvalidParameter`: an input violates its documented range
/// - `NumericInstability`: a simulated price is non-finite or non-positive,
///   or a mean, variance or estimate overflowed
///
/// # Examples
/// ```
/// use forecast_kernel::SimulationError;
///
/// let err = SimulationError::invalid("sigma", "must be non-negative, got -0.1");
/// assert_eq!(
///     err.to_string(),
///     "Invalid parameter 'sigma': must be non-negative, got -0.1"
/// );
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimulationError {
    /// Invalid input parameter.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the violated constraint.
        reason: String,
    },

    /// A simulated price left the positive finite range, or a statistic
    /// derived from the prices overflowed.
    #[error("Numerical instability at {step_count} steps: produced {value}")]
    NumericInstability {
        /// Step count of the simulation that produced the value.
        step_count: usize,
        /// The offending price or statistic.
        value: f64,
    },
}

impl SimulationError {
    /// Creates an `InvalidParameter` error.
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Returns `true` for `InvalidParameter`.
    #[inline]
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }

    /// Returns `true` for `NumericInstability`.
    #[inline]
    pub fn is_numeric_instability(&self) -> bool {
        matches!(self, Self::NumericInstability { .. })
    }
}

/// Result alias for kernel operations.
pub type SimulationResult<T> = Result<T, SimulationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_display() {
        let err = SimulationError::invalid("n_samples", "must be in range [1, 10000000], got 0");
        assert!(err.to_string().contains("n_samples"));
        assert!(err.is_invalid_parameter());
        assert!(!err.is_numeric_instability());
    }

    #[test]
    fn test_numeric_instability_display() {
        let err = SimulationError::NumericInstability {
            step_count: 16,
            value: f64::INFINITY,
        };
        let msg = err.to_string();
        assert!(msg.contains("16 steps"));
        assert!(msg.contains("inf"));
        assert!(err.is_numeric_instability());
    }
}
