//! optimization — likelihood maximization and simplex-constrained solvers.
//!
//! Purpose
//! -------
//! Keep the numerical optimization backends in one place so the model and
//! calibration layers stay agnostic of solver wiring:
//! - [`mle`] maximizes a user [`LogLikelihood`](mle::LogLikelihood) with
//!   L-BFGS (`argmin`) and finite-difference gradients (`finitediff`).
//! - [`simplex`] minimizes smooth convex objectives over the probability
//!   simplex with an accelerated projected-gradient method.
//! - [`errors`] normalizes backend and validation failures into
//!   [`OptError`].
//!
//! Downstream usage
//! ----------------
//! - The SARIMA fitter implements `LogLikelihood` and calls
//!   [`mle::maximize`]; the calibration engine builds its least-squares
//!   objective and calls [`simplex::minimize_on_simplex`].

pub mod errors;
pub mod mle;
pub mod simplex;

pub use self::errors::{OptError, OptResult};
pub use self::mle::{
    LineSearcher, LogLikelihood, MleOptions, OptimOutcome, Theta, Tolerances, maximize,
};
pub use self::simplex::{SimplexOptions, SimplexOutcome, minimize_on_simplex, project_onto_simplex};
