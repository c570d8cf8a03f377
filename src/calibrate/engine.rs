//! Calibration engine — reweight ensemble paths so the weighted mean hits
//! annual targets at their reference quarters.
//!
//! Purpose
//! -------
//! Solve `min_w || S w - T ||^2` over the probability simplex, where each
//! row of `S` holds all paths' values at one target year's reference
//! quarter and `T` the corresponding target levels. The solver is the
//! crate's accelerated projected-gradient routine with an exact simplex
//! projection, so the constraints `w >= 0`, `sum(w) = 1` hold exactly at
//! every iterate.
//!
//! Key behaviors
//! -------------
//! - Target years whose reference quarter falls outside the forecast index
//!   are skipped; if none remain, calibration fails loudly with
//!   [`CalibrationError::NoTargetOverlap`] rather than returning uniform
//!   weights.
//! - Non-convergence within the iteration budget is an error carrying the
//!   solver's status message; a half-converged weight vector is never
//!   returned.
use ndarray::{Array1, Array2};

use crate::calibrate::errors::{CalibrationError, CalibrationResult};
use crate::calibrate::targets::AnnualTargets;
use crate::calibrate::weights::PathWeights;
use crate::optimization::{SimplexOptions, minimize_on_simplex};
use crate::simulate::SimulationEnsemble;

/// Solver budget for the calibration fit.
///
/// Defaults mirror the constrained solver's: objective tolerance `1e-12`
/// and an iteration cap of 5000.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationOptions {
    pub tol_objective: f64,
    pub max_iter: usize,
}

impl Default for CalibrationOptions {
    fn default() -> Self {
        let defaults = SimplexOptions::default();
        Self { tol_objective: defaults.tol_objective, max_iter: defaults.max_iter }
    }
}

/// Calibrate path weights against `targets`.
///
/// Starts from uniform weights, the natural uninformative initial point.
///
/// # Errors
/// - [`CalibrationError::NoTargetOverlap`] when no target year's reference
///   quarter lies inside the ensemble index.
/// - [`CalibrationError::SolverFailure`] for solver setup or evaluation
///   errors.
/// - [`CalibrationError::DidNotConverge`] when the iteration budget runs
///   out first.
pub fn calibrate_ensemble(
    ensemble: &SimulationEnsemble, targets: &AnnualTargets, opts: &CalibrationOptions,
) -> CalibrationResult<PathWeights> {
    let index = ensemble.index();
    let mut rows: Vec<usize> = Vec::new();
    let mut levels: Vec<f64> = Vec::new();
    for (row, quarter) in index.iter().enumerate() {
        if quarter.quarter() != targets.reference_quarter() {
            continue;
        }
        if let Some(level) = targets.get(quarter.year()) {
            rows.push(row);
            levels.push(level);
        }
    }
    if rows.is_empty() {
        return Err(CalibrationError::NoTargetOverlap {
            first: index[0],
            last: index[index.len() - 1],
        });
    }

    let n_paths = ensemble.n_paths();
    let mut s = Array2::zeros((rows.len(), n_paths));
    for (k, &row) in rows.iter().enumerate() {
        s.row_mut(k).assign(&ensemble.values().row(row));
    }
    let t = Array1::from_vec(levels);

    // Feasible iterates all sum to one, so the solver only ever moves
    // along zero-sum directions; the curvature it sees there is 2 C'C
    // with C the row-centered target matrix. The level shared by every
    // path drops out of C, which keeps the step orders of magnitude
    // larger than a raw ||S||-based bound on level-dominated ensembles.
    let curvature = leading_curvature(&s);
    if curvature <= 0.0 {
        // Every path is identical at every target row, so the objective
        // is constant in w and uniform weights are already optimal.
        return Ok(PathWeights::uniform(n_paths));
    }
    // The Rayleigh estimate approaches the eigenvalue from below; pad it.
    let step = 1.0 / (2.2 * curvature);

    let objective = |w: &Array1<f64>| -> f64 {
        let resid = &s.dot(w) - &t;
        resid.dot(&resid)
    };
    let gradient = |w: &Array1<f64>| -> Array1<f64> {
        let resid = &s.dot(w) - &t;
        s.t().dot(&resid) * 2.0
    };

    let solver_opts = SimplexOptions::new(opts.tol_objective, opts.max_iter)
        .map_err(|err| CalibrationError::SolverFailure { message: err.to_string() })?;
    let outcome = minimize_on_simplex(
        objective,
        gradient,
        PathWeights::uniform(n_paths).as_array().clone(),
        step,
        &solver_opts,
    )
    .map_err(|err| CalibrationError::SolverFailure { message: err.to_string() })?;

    if !outcome.converged {
        return Err(CalibrationError::DidNotConverge { status: outcome.status });
    }
    PathWeights::new(outcome.weights)
}

/// Leading eigenvalue of `C'C`, where `C` is `s` with each row centered,
/// estimated by power iteration with a Rayleigh-quotient stopping rule.
///
/// `C` annihilates the all-ones direction, so a single application of
/// `C'C` already confines the iterate to the zero-sum subspace the
/// solver moves in.
fn leading_curvature(s: &Array2<f64>) -> f64 {
    let n = s.ncols();
    let mut c = s.to_owned();
    for mut row in c.rows_mut() {
        let mean = row.mean().unwrap_or(0.0);
        row.mapv_inplace(|x| x - mean);
    }

    // Deterministic start with entries straddling zero.
    let mut v = Array1::from_shape_fn(n, |j| j as f64 - (n as f64 - 1.0) / 2.0);
    let scale = v.dot(&v).sqrt();
    if scale > 0.0 {
        v.mapv_inplace(|x| x / scale);
    }

    let mut lambda = 0.0;
    for _ in 0..200 {
        let image = c.t().dot(&c.dot(&v));
        let norm = image.dot(&image).sqrt();
        if !norm.is_finite() || norm <= 0.0 {
            return 0.0;
        }
        let estimate = v.dot(&image);
        v = image / norm;
        if (estimate - lambda).abs() <= 1e-6 * estimate.abs().max(1e-12) {
            return estimate;
        }
        lambda = estimate;
    }
    lambda
}
