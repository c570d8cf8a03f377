//! Path weights: a validated probability vector over simulated paths.
use ndarray::Array1;

use crate::calibrate::errors::{CalibrationError, CalibrationResult};

/// Tolerance on the weight sum when validating external weight vectors.
const SUM_TOLERANCE: f64 = 1e-9;

/// Non-negative weights over the ensemble's paths, summing to one.
///
/// Produced by the calibration engine or built uniform when calibration is
/// skipped; consumed by the distributional summarizer.
#[derive(Debug, Clone, PartialEq)]
pub struct PathWeights {
    weights: Array1<f64>,
}

impl PathWeights {
    /// Uniform weights `1/n` over `n` paths.
    pub fn uniform(n: usize) -> Self {
        Self { weights: Array1::from_elem(n, 1.0 / n as f64) }
    }

    /// Validate and wrap an externally produced weight vector.
    ///
    /// # Errors
    /// - [`CalibrationError::InvalidWeight`] for negative or non-finite
    ///   entries.
    /// - [`CalibrationError::SumMismatch`] when the sum strays from one by
    ///   more than `1e-9`.
    pub fn new(weights: Array1<f64>) -> CalibrationResult<Self> {
        for (index, &value) in weights.iter().enumerate() {
            if !value.is_finite() {
                return Err(CalibrationError::InvalidWeight {
                    index,
                    value,
                    reason: "weights must be finite",
                });
            }
            if value < 0.0 {
                return Err(CalibrationError::InvalidWeight {
                    index,
                    value,
                    reason: "weights must be non-negative",
                });
            }
        }
        let sum = weights.sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(CalibrationError::SumMismatch { sum });
        }
        Ok(Self { weights })
    }

    /// The weight vector.
    pub fn as_array(&self) -> &Array1<f64> {
        &self.weights
    }

    /// Number of weighted paths.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether the vector is empty.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
