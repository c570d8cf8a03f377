//! Forecasting models — classical SARIMA and a Bayesian structural
//! alternative, unified behind the [`PathSimulator`] trait.
//!
//! Purpose
//! -------
//! Fit a model to a normalized quarterly series and hand the simulation
//! generator an object that can produce seeded stochastic forecast paths.
//! The two fitters differ in estimation machinery (conditional maximum
//! likelihood vs. Gibbs sampling) but expose the same simulation surface.
//!
//! Conventions
//! -----------
//! - [`PathSimulator::simulate_paths`] returns paths in the model's native
//!   path-major orientation `(n_paths, steps)`; the simulation generator
//!   normalizes orientation for downstream consumers.
//! - All fitting failures are [`FitError`] values, never panics, so the
//!   pipeline can catch a structural failure and fall back to the
//!   classical model.
pub mod errors;
pub mod sarima;
pub mod structural;

pub use errors::{FitError, FitResult};
pub use sarima::{SarimaFit, SarimaOrders, SarimaSpec};
pub use structural::{PosteriorDraws, StructuralFit, StructuralOptions, StructuralSpec};

use ndarray::Array2;

/// A fitted model that can simulate stochastic forecast continuations.
///
/// Implementors anchor simulation at the end of their in-sample data and
/// guarantee bit-identical output for identical `(steps, n_paths, seed)`
/// inputs.
pub trait PathSimulator {
    /// Simulate `n_paths` forecast paths of length `steps`, seeded by
    /// `seed`, in native `(n_paths, steps)` orientation.
    fn simulate_paths(&self, steps: usize, n_paths: usize, seed: u64) -> FitResult<Array2<f64>>;
}
