//! Maximum-likelihood machinery — maximize a user log-likelihood with
//! L-BFGS over `argmin`.
//!
//! Purpose
//! -------
//! Expose a small, typed surface for maximum-likelihood fitting: a
//! [`LogLikelihood`] trait for the model, validated [`MleOptions`] /
//! [`Tolerances`], an adapter that presents the *maximization* of `l(theta)`
//! to `argmin` as the *minimization* of `c(theta) = -l(theta)`, and a
//! [`maximize`] entry point returning a validated [`OptimOutcome`].
//!
//! Key behaviors
//! -------------
//! - Analytic gradients are optional: when [`LogLikelihood::grad`] reports
//!   [`OptError::GradientNotImplemented`], a central-difference gradient of
//!   the cost is used, with a forward-difference retry if the central pass
//!   produced an error or a non-finite entry.
//! - Solver failures and non-finite objective values are normalized into
//!   [`OptError`] rather than panicking.
//! - The outcome carries the termination status string verbatim so fitting
//!   layers can surface the solver's diagnostic message.
//!
//! Conventions
//! -----------
//! - `Theta` and `Grad` are `ndarray::Array1<f64>` column vectors over the
//!   free parameters; `Cost` is a scalar in log-likelihood space.
//! - Sign flips between cost and log-likelihood happen only inside
//!   [`ArgMinAdapter`]; user code thinks in log-likelihood terms throughout.
use std::cell::RefCell;
use std::collections::HashMap;
use std::str::FromStr;

use argmin::core::{
    CostFunction, Error, Executor, Gradient, IterState, State, TerminationStatus,
};
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use finitediff::FiniteDiff;
use ndarray::Array1;

use crate::optimization::errors::{OptError, OptResult};

/// Parameter vector `theta` for log-likelihood optimization.
pub type Theta = Array1<f64>;

/// Gradient vector matching the shape of [`Theta`].
pub type Grad = Array1<f64>;

/// Scalar objective value in log-likelihood space.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
pub type FnEvalMap = HashMap<String, u64>;

/// Default history size for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Hager-Zhang line search specialized to this crate's numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

/// More-Thuente line search specialized to this crate's numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// A model whose log-likelihood `l(theta)` can be maximized.
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate `l(theta)`.
/// - `check(&Theta, &Data) -> OptResult<()>`: cheap validation used to reject
///   obviously invalid `theta`/`data` pairs before optimization starts.
///
/// Optional:
/// - `grad(&Theta, &Data) -> OptResult<Grad>`: analytic gradient of `l`.
///   If not implemented, robust finite differences are used automatically.
pub trait LogLikelihood {
    type Data: 'static;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Choice of line search used inside the L-BFGS solver.
///
/// Implements `FromStr` with case-insensitive names (`"MoreThuente"`,
/// `"HagerZhang"`); unknown names return [`OptError::InvalidLineSearch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Numerical tolerances and iteration limits used by the optimizer.
///
/// Any field can be `None` but at least one of the three must be provided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        if let Some(tol) = tol_grad {
            if !tol.is_finite() || tol <= 0.0 {
                return Err(OptError::InvalidTolGrad {
                    tol,
                    reason: "Gradient tolerance must be finite and strictly positive.",
                });
            }
        }
        if let Some(tol) = tol_cost {
            if !tol.is_finite() || tol <= 0.0 {
                return Err(OptError::InvalidTolCost {
                    tol,
                    reason: "Cost tolerance must be finite and strictly positive.",
                });
            }
        }
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Optimizer-level configuration for likelihood maximization.
#[derive(Debug, Clone, PartialEq)]
pub struct MleOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub lbfgs_mem: Option<usize>,
}

impl MleOptions {
    /// Create a new set of optimizer options; numeric validation of the
    /// tolerances happens in [`Tolerances::new`].
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(mem) = lbfgs_mem {
            if mem == 0 {
                return Err(OptError::InvalidLbfgsMem {
                    mem,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self { tols, line_searcher, lbfgs_mem })
    }
}

impl Default for MleOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-6), tol_cost: None, max_iter: Some(300) },
            line_searcher: LineSearcher::MoreThuente,
            lbfgs_mem: None,
        }
    }
}

/// Canonical result returned by [`maximize`].
///
/// - `theta_hat`: best parameter vector found (validated finite).
/// - `value`: best **log-likelihood** value `l(theta_hat)` (not the cost).
/// - `converged`: `true` if the solver reported a terminating status other
///   than `NotTerminated`, including `MaxItersReached`. It records that
///   the run terminated with a reason, not that a tolerance was met;
///   inspect `status` to tell the two apart.
/// - `status`: human-readable termination status string.
/// - `iterations`: number of optimizer iterations performed.
/// - `fn_evals`: function-evaluation counters reported by `argmin`.
/// - `grad_norm`: norm of the last available gradient, if present.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver state.
    ///
    /// # Errors
    /// - [`OptError::MissingThetaHat`] / [`OptError::InvalidThetaHat`] when
    ///   the best parameter vector is absent or non-finite.
    /// - [`OptError::NonFiniteCost`] when the best value is not finite.
    pub fn new(
        theta_hat: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = theta_hat.ok_or(OptError::MissingThetaHat)?;
        for (index, &entry) in theta_hat.iter().enumerate() {
            if !entry.is_finite() {
                return Err(OptError::InvalidThetaHat {
                    index,
                    value: entry,
                    reason: "Estimated parameters must be finite.",
                });
            }
        }
        if !value.is_finite() {
            return Err(OptError::NonFiniteCost { value });
        }
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            other => (true, format!("{other:?}")),
        };
        let grad_norm = grad.map(|g| g.dot(&g).sqrt());
        Ok(Self {
            theta_hat,
            value,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
            grad_norm,
        })
    }
}

/// Bridges a user [`LogLikelihood`] to `argmin`'s `CostFunction`/`Gradient`.
///
/// - `cost` returns `-l(theta)` (negative log-likelihood).
/// - `gradient` returns `-grad l(theta)` when the user provides an analytic
///   gradient, or a finite-difference gradient of the cost otherwise (no sign
///   flip needed in that branch).
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    /// Construct a new adapter over a user [`LogLikelihood`] and its data.
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let value = self.f.value(theta, self.data)?;
        if !value.is_finite() {
            return Err((OptError::NonFiniteCost { value }).into());
        }
        Ok(-value)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate the gradient of the cost at `theta`.
    ///
    /// Uses the analytic gradient if implemented, otherwise central
    /// differences of the cost with a forward-difference retry when the
    /// central pass raised an error or produced a non-finite entry.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = theta.len();
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, dim)?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => {
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let cost_fn = |theta: &Theta| -> f64 {
                    match self.cost(theta) {
                        Ok(value) => value,
                        Err(err) => {
                            let mut slot = closure_err.borrow_mut();
                            if slot.is_none() {
                                *slot = Some(err);
                            }
                            f64::NAN
                        }
                    }
                };
                let central = theta.central_diff(&cost_fn);
                if closure_err.borrow().is_none() && validate_grad(&central, dim).is_ok() {
                    return Ok(central);
                }
                closure_err.replace(None);
                let forward = theta.forward_diff(&cost_fn);
                if let Some(err) = closure_err.take() {
                    return Err(err);
                }
                validate_grad(&forward, dim)?;
                Ok(forward)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Maximize a log-likelihood `l(theta)` using L-BFGS with the chosen line
/// search.
///
/// # Behavior
/// - Validates the initial guess via `f.check(theta0, data)`.
/// - Wraps `(f, data)` in an [`ArgMinAdapter`] and builds an L-BFGS solver
///   with the configured line search, tolerances, and memory.
/// - Returns a validated [`OptimOutcome`] whose `value` is `l(theta_hat)`.
///
/// # Errors
/// - Propagates any error from `f.check`.
/// - Propagates solver construction and runtime errors as [`OptError`].
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MleOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let linesearch: MoreThuenteLS = MoreThuenteLineSearch::new();
            let solver = with_tolerances(LBFGS::new(linesearch, mem), &opts.tols)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let linesearch: HagerZhangLS = HagerZhangLineSearch::new();
            let solver = with_tolerances(LBFGS::new(linesearch, mem), &opts.tols)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}

/// Apply gradient/cost tolerances to a freshly built L-BFGS solver.
fn with_tolerances<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, tols: &Tolerances,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(tol) = tols.tol_grad {
        solver = solver.with_tolerance_grad(tol)?;
    }
    if let Some(tol) = tols.tol_cost {
        solver = solver.with_tolerance_cost(tol)?;
    }
    Ok(solver)
}

/// Run an `argmin` solver on an adapted log-likelihood problem and convert
/// the terminal state into a crate-friendly [`OptimOutcome`].
fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MleOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: argmin::core::Solver<ArgMinAdapter<'a, F>, IterState<Theta, Grad, (), (), (), f64>>
        + Send
        + 'static,
{
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(theta0));
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let fn_evals = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    OptimOutcome::new(
        result.take_best_param(),
        -result.get_best_cost(),
        termination,
        iterations,
        fn_evals,
        grad,
    )
}

/// Validate a gradient's dimension and finiteness.
pub(crate) fn validate_grad(grad: &Grad, expected: usize) -> OptResult<()> {
    if grad.len() != expected {
        return Err(OptError::GradientDimMismatch { expected, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient entries must be finite.",
            });
        }
    }
    Ok(())
}
