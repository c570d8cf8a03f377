//! Simplex-constrained minimization — accelerated projected gradient over
//! the probability simplex.
//!
//! Purpose
//! -------
//! Minimize a smooth convex objective `f(w)` subject to `w >= 0` and
//! `sum(w) = 1`, the constraint set of the path-reweighting problem. The
//! solver is an accelerated projected-gradient method (Nesterov momentum
//! with adaptive restart) using the exact Euclidean projection onto the
//! simplex, which handles the linear equality and bound constraints that an
//! SQP solver would otherwise carry explicitly.
//!
//! Key behaviors
//! -------------
//! - [`project_onto_simplex`] computes the exact Euclidean projection by the
//!   sort-and-threshold construction, so iterates are feasible at every step.
//! - [`minimize_on_simplex`] iterates until the objective change falls below
//!   `tol_objective` or the iteration cap is reached; the outcome carries a
//!   termination message either way and `converged` tells them apart.
//! - Non-finite objective or gradient values surface as [`OptError`] rather
//!   than propagating NaNs into the weight vector.
//!
//! Conventions
//! -----------
//! - The caller supplies the gradient step size (for a quadratic
//!   least-squares objective, `1 / (2 ||S||_F^2)` is a safe choice since the
//!   Frobenius norm bounds the spectral norm).
//! - Momentum restarts whenever an accelerated step would increase the
//!   objective, falling back to a plain projected-gradient step, which keeps
//!   the iteration monotone.
use ndarray::Array1;

use crate::optimization::errors::{OptError, OptResult};

/// Options for the simplex-constrained solver.
///
/// Defaults follow the calibration contract: objective-change tolerance
/// `1e-12` and a generous iteration cap of 5000.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplexOptions {
    pub tol_objective: f64,
    pub max_iter: usize,
}

impl SimplexOptions {
    /// Construct validated options.
    ///
    /// # Errors
    /// - [`OptError::InvalidTolCost`] for a non-finite or non-positive
    ///   tolerance.
    /// - [`OptError::InvalidMaxIter`] for a zero iteration cap.
    pub fn new(tol_objective: f64, max_iter: usize) -> OptResult<Self> {
        if !tol_objective.is_finite() || tol_objective <= 0.0 {
            return Err(OptError::InvalidTolCost {
                tol: tol_objective,
                reason: "Objective tolerance must be finite and strictly positive.",
            });
        }
        if max_iter == 0 {
            return Err(OptError::InvalidMaxIter {
                max_iter,
                reason: "Iteration cap must be greater than zero.",
            });
        }
        Ok(Self { tol_objective, max_iter })
    }
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self { tol_objective: 1e-12, max_iter: 5000 }
    }
}

/// Result of a simplex-constrained minimization.
///
/// - `weights`: feasible minimizer candidate (non-negative, sums to 1).
/// - `objective`: objective value at `weights`.
/// - `converged`: whether the objective-change criterion was met.
/// - `status`: human-readable termination message.
/// - `iterations`: iterations performed.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexOutcome {
    pub weights: Array1<f64>,
    pub objective: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
}

/// Exact Euclidean projection of `v` onto the probability simplex
/// `{ w : w >= 0, sum(w) = 1 }`.
///
/// Sort-and-threshold construction: with `u` the entries of `v` sorted
/// descending, the threshold is `tau = (cumsum(u)_rho - 1) / rho` for the
/// largest prefix `rho` with `u_rho > tau`, and the projection is
/// `max(v - tau, 0)` element-wise.
pub fn project_onto_simplex(v: &Array1<f64>) -> Array1<f64> {
    let n = v.len();
    if n == 0 {
        return v.clone();
    }
    let mut sorted: Vec<f64> = v.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    // The first prefix always passes the threshold test, so tau is always set.
    let mut cumulative = 0.0;
    let mut tau = 0.0;
    for (i, &u) in sorted.iter().enumerate() {
        cumulative += u;
        let candidate = (cumulative - 1.0) / (i as f64 + 1.0);
        if u - candidate > 0.0 {
            tau = candidate;
        }
    }
    v.mapv(|x| (x - tau).max(0.0))
}

/// Minimize `objective` over the probability simplex starting from `w0`.
///
/// `gradient` must return the gradient of `objective`; `step` is the fixed
/// gradient step size (see the module notes for a safe choice).
///
/// # Errors
/// - [`OptError::InvalidStepSize`] for a non-finite or non-positive step.
/// - [`OptError::NonFiniteCost`] when the objective returns NaN/±inf.
/// - [`OptError::InvalidGradient`] / [`OptError::GradientDimMismatch`] for
///   invalid gradient output.
pub fn minimize_on_simplex<F, G>(
    objective: F, gradient: G, w0: Array1<f64>, step: f64, opts: &SimplexOptions,
) -> OptResult<SimplexOutcome>
where
    F: Fn(&Array1<f64>) -> f64,
    G: Fn(&Array1<f64>) -> Array1<f64>,
{
    if !step.is_finite() || step <= 0.0 {
        return Err(OptError::InvalidStepSize {
            step,
            reason: "Gradient step size must be finite and strictly positive.",
        });
    }
    let dim = w0.len();
    let eval = |w: &Array1<f64>| -> OptResult<f64> {
        let value = objective(w);
        if !value.is_finite() {
            return Err(OptError::NonFiniteCost { value });
        }
        Ok(value)
    };
    let grad_at = |w: &Array1<f64>| -> OptResult<Array1<f64>> {
        let g = gradient(w);
        crate::optimization::mle::validate_grad(&g, dim)?;
        Ok(g)
    };

    let mut w = project_onto_simplex(&w0);
    let mut momentum_point = w.clone();
    let mut t = 1.0_f64;
    let mut f_current = eval(&w)?;

    let mut iterations = opts.max_iter;
    let mut converged = false;
    let mut status = format!(
        "Iteration cap of {} reached before the objective change fell below {:.1e}.",
        opts.max_iter, opts.tol_objective
    );

    for iter in 1..=opts.max_iter {
        let g = grad_at(&momentum_point)?;
        let mut w_next = project_onto_simplex(&(&momentum_point - &(&g * step)));
        let mut f_next = eval(&w_next)?;
        if f_next > f_current {
            // Restart momentum with a plain projected step from the last
            // accepted iterate; with step <= 1/L this cannot increase f.
            let g = grad_at(&w)?;
            w_next = project_onto_simplex(&(&w - &(&g * step)));
            f_next = eval(&w_next)?;
            t = 1.0;
        }
        let t_next = 0.5 * (1.0 + (1.0 + 4.0 * t * t).sqrt());
        momentum_point = &w_next + &((&w_next - &w) * ((t - 1.0) / t_next));
        t = t_next;

        let delta = (f_current - f_next).abs();
        w = w_next;
        f_current = f_next;
        if delta <= opts.tol_objective {
            iterations = iter;
            converged = true;
            status = format!(
                "Objective change {delta:.3e} fell below tolerance after {iter} iterations."
            );
            break;
        }
    }

    Ok(SimplexOutcome { weights: w, objective: f_current, converged, status, iterations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Feasibility and exactness of the Euclidean simplex projection.
    // - Convergence of the accelerated projected-gradient loop on small
    //   quadratic objectives with known minimizers.
    // - Option validation and non-convergence reporting.
    //
    // They intentionally DO NOT cover the calibration objective itself;
    // the calibrate module has its own coverage.
    // -------------------------------------------------------------------------

    fn assert_feasible(w: &Array1<f64>) {
        assert!(w.iter().all(|&x| x >= 0.0), "negative entry in {w:?}");
        assert!((w.sum() - 1.0).abs() < 1e-12, "sum {} != 1", w.sum());
    }

    #[test]
    fn projection_is_identity_on_the_simplex() {
        let w = array![0.2, 0.3, 0.5];
        let p = project_onto_simplex(&w);
        for i in 0..3 {
            assert!((p[i] - w[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn projection_is_feasible_for_arbitrary_input() {
        for v in [
            array![10.0, -3.0, 0.4],
            array![-1.0, -2.0, -3.0],
            array![0.0, 0.0, 0.0, 0.0],
            array![1e6, 1e-6],
        ] {
            assert_feasible(&project_onto_simplex(&v));
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify the projection against a hand-computed case.
    //
    // Given
    // -----
    // - v = (0.9, 0.5, -0.2): tau = 0.2, so the projection is (0.7, 0.3, 0).
    fn projection_matches_hand_computed_case() {
        let p = project_onto_simplex(&array![0.9, 0.5, -0.2]);
        assert!((p[0] - 0.7).abs() < 1e-12);
        assert!((p[1] - 0.3).abs() < 1e-12);
        assert!(p[2].abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Minimize ||w - c||^2 over the simplex; the solution is the projection
    // of c, which the solver should reach to tight tolerance.
    fn minimizer_matches_projection_of_target() {
        let c = array![0.9, 0.5, -0.2];
        let expected = project_onto_simplex(&c);
        let objective = |w: &Array1<f64>| {
            let d = w - &c;
            d.dot(&d)
        };
        let gradient = |w: &Array1<f64>| (w - &c) * 2.0;
        let w0 = Array1::from_elem(3, 1.0 / 3.0);

        let out =
            minimize_on_simplex(objective, gradient, w0, 0.5, &SimplexOptions::default()).unwrap();

        assert!(out.converged, "status: {}", out.status);
        assert_feasible(&out.weights);
        for i in 0..3 {
            assert!((out.weights[i] - expected[i]).abs() < 1e-6);
        }
    }

    #[test]
    fn reports_non_convergence_at_iteration_cap() {
        let c = array![5.0, -5.0];
        let objective = |w: &Array1<f64>| {
            let d = w - &c;
            d.dot(&d)
        };
        let gradient = |w: &Array1<f64>| (w - &c) * 2.0;
        let w0 = Array1::from_elem(2, 0.5);
        // A step so small the tolerance cannot be met in two iterations.
        let opts = SimplexOptions::new(1e-18, 2).unwrap();

        let out = minimize_on_simplex(objective, gradient, w0, 1e-9, &opts).unwrap();

        assert!(!out.converged);
        assert!(out.status.contains("Iteration cap"));
        assert_feasible(&out.weights);
    }

    #[test]
    fn rejects_invalid_step_and_options() {
        let objective = |_: &Array1<f64>| 0.0;
        let gradient = |w: &Array1<f64>| w.clone();
        let w0 = Array1::from_elem(2, 0.5);
        assert!(matches!(
            minimize_on_simplex(objective, gradient, w0, -1.0, &SimplexOptions::default()),
            Err(OptError::InvalidStepSize { .. })
        ));
        assert!(matches!(SimplexOptions::new(0.0, 10), Err(OptError::InvalidTolCost { .. })));
        assert!(matches!(SimplexOptions::new(1e-12, 0), Err(OptError::InvalidMaxIter { .. })));
    }
}
