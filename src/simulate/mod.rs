//! Simulation generation — build a seeded, time-major forecast ensemble
//! from a fitted model.
//!
//! Purpose
//! -------
//! Own the orientation contract between models and downstream consumers:
//! models simulate in their native path-major layout, and this module
//! transposes to the canonical `(steps, n_paths)` [`SimulationEnsemble`]
//! and attaches the quarterly forecast index.
pub mod ensemble;
pub mod errors;
pub mod horizon;

pub use ensemble::SimulationEnsemble;
pub use errors::{ConfigError, SimulationError};
pub use horizon::ForecastHorizon;

use crate::model::PathSimulator;
use crate::series::{Quarter, QuarterlySeries};

/// Generate a forecast ensemble from a fitted model.
///
/// The horizon runs from the quarter after `series`'s last observation
/// through `end` inclusive. Identical inputs and seed produce identical
/// ensembles.
///
/// # Errors
/// - [`ConfigError::InvalidSimulationCount`] when `n_paths < 1`.
/// - [`ConfigError::EmptyHorizon`] when `end` is not after the sample.
/// - Any [`crate::model::FitError`] raised by the model's simulator.
pub fn generate_ensemble(
    model: &dyn PathSimulator, series: &QuarterlySeries, end: Quarter, n_paths: usize,
    seed: u64,
) -> Result<SimulationEnsemble, SimulationError> {
    if n_paths < 1 {
        return Err(ConfigError::InvalidSimulationCount { n: n_paths }.into());
    }
    let horizon = ForecastHorizon::after(series.last_period(), end)?;
    let native = model.simulate_paths(horizon.steps(), n_paths, seed)?;
    let values = native.t().to_owned();
    Ok(SimulationEnsemble::new(values, horizon.index())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::errors::FitResult;
    use ndarray::Array2;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the generator's orientation and validation contract
    // using a stub simulator with recognizable entries. Model-specific
    // simulation behavior lives with the models.
    // -------------------------------------------------------------------------

    /// Writes `path * 100 + step` so orientation mistakes are visible.
    struct StubSimulator;

    impl PathSimulator for StubSimulator {
        fn simulate_paths(
            &self, steps: usize, n_paths: usize, _seed: u64,
        ) -> FitResult<Array2<f64>> {
            let mut paths = Array2::zeros((n_paths, steps));
            for j in 0..n_paths {
                for t in 0..steps {
                    paths[[j, t]] = (j * 100 + t) as f64;
                }
            }
            Ok(paths)
        }
    }

    fn short_series() -> QuarterlySeries {
        let start = Quarter::new(2022, 1);
        let pairs: Vec<(Quarter, f64)> = (0..8)
            .map(|i| (Quarter::from_ordinal(start.ordinal() + i as i64), 1.0 + i as f64))
            .collect();
        QuarterlySeries::new(pairs).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // The generator must transpose native path-major output into the
    // canonical time-major ensemble.
    fn generate_ensemble_is_time_major() {
        let series = short_series();
        let ensemble =
            generate_ensemble(&StubSimulator, &series, Quarter::new(2024, 4), 3, 42).unwrap();

        assert_eq!(ensemble.steps(), 4);
        assert_eq!(ensemble.n_paths(), 3);
        // Row = step, column = path.
        assert_eq!(ensemble.values()[[0, 0]], 0.0);
        assert_eq!(ensemble.values()[[0, 2]], 200.0);
        assert_eq!(ensemble.values()[[3, 1]], 103.0);
        assert_eq!(ensemble.index()[0], Quarter::new(2024, 1));
        assert_eq!(ensemble.index()[3], Quarter::new(2024, 4));
    }

    #[test]
    fn generate_ensemble_rejects_zero_paths() {
        let series = short_series();
        let err = generate_ensemble(&StubSimulator, &series, Quarter::new(2024, 4), 0, 42)
            .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Config(ConfigError::InvalidSimulationCount { n: 0 })
        ));
    }

    #[test]
    fn generate_ensemble_rejects_empty_horizon() {
        let series = short_series();
        let err = generate_ensemble(&StubSimulator, &series, Quarter::new(2023, 4), 5, 42)
            .unwrap_err();
        assert!(matches!(err, SimulationError::Config(ConfigError::EmptyHorizon { .. })));
    }
}
