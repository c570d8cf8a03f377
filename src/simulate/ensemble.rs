//! The simulation ensemble: forecast paths in canonical time-major
//! orientation, aligned to a quarterly index.
use ndarray::Array2;

use crate::series::Quarter;
use crate::simulate::errors::{ConfigError, ConfigResult};

/// A matrix of simulated forecast paths.
///
/// Values are `(steps, n_paths)`: each row is one forecast quarter across
/// all paths, each column is one full path. The index holds one quarter
/// per row. Downstream consumers (calibration, summarization) rely on this
/// orientation and never re-check it.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationEnsemble {
    values: Array2<f64>,
    index: Vec<Quarter>,
}

impl SimulationEnsemble {
    /// Wrap a time-major value matrix with its quarterly index.
    ///
    /// # Errors
    /// - [`ConfigError::IndexMismatch`] if the index length differs from the
    ///   matrix row count.
    pub fn new(values: Array2<f64>, index: Vec<Quarter>) -> ConfigResult<Self> {
        if values.nrows() != index.len() {
            return Err(ConfigError::IndexMismatch {
                rows: values.nrows(),
                len: index.len(),
            });
        }
        Ok(Self { values, index })
    }

    /// Number of forecast quarters.
    pub fn steps(&self) -> usize {
        self.values.nrows()
    }

    /// Number of simulated paths.
    pub fn n_paths(&self) -> usize {
        self.values.ncols()
    }

    /// The `(steps, n_paths)` value matrix.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// One quarter per row of [`Self::values`].
    pub fn index(&self) -> &[Quarter] {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensemble_exposes_dimensions_and_index() {
        let index = vec![Quarter::new(2024, 1), Quarter::new(2024, 2)];
        let ensemble = SimulationEnsemble::new(Array2::zeros((2, 5)), index.clone()).unwrap();

        assert_eq!(ensemble.steps(), 2);
        assert_eq!(ensemble.n_paths(), 5);
        assert_eq!(ensemble.index(), &index[..]);
    }

    #[test]
    fn ensemble_rejects_misaligned_index() {
        let index = vec![Quarter::new(2024, 1)];
        assert!(matches!(
            SimulationEnsemble::new(Array2::zeros((2, 5)), index),
            Err(ConfigError::IndexMismatch { rows: 2, len: 1 })
        ));
    }
}
