//! Errors for the optimization layer (likelihood maximization and
//! simplex-constrained minimization).
//!
//! Normalizes backend (`argmin`) failures, option validation, and outcome
//! validation into a single [`OptError`] with human-readable messages.
use argmin::core::Error;

/// Result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// Implies that finite differences should be used.
    GradientNotImplemented,

    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch { expected: usize, found: usize },

    /// Gradient elements need to be finite.
    InvalidGradient { index: usize, value: f64, reason: &'static str },

    // ---- Parameters ----
    /// Parameter vector has the wrong dimension for the problem.
    ThetaDimMismatch { expected: usize, found: usize },

    /// Initial parameter entries must be finite.
    InvalidTheta0 { index: usize, value: f64, reason: &'static str },

    // ---- Options validation ----
    /// Gradient tolerance needs to be positive and finite.
    InvalidTolGrad { tol: f64, reason: &'static str },

    /// Cost/objective change tolerance needs to be positive and finite.
    InvalidTolCost { tol: f64, reason: &'static str },

    /// Maximum iterations needs to be positive.
    InvalidMaxIter { max_iter: usize, reason: &'static str },

    /// At least one tolerance must be provided.
    NoTolerancesProvided,

    /// Invalid line searcher name.
    InvalidLineSearch { name: String, reason: &'static str },

    /// L-BFGS memory needs to be at least 1.
    InvalidLbfgsMem { mem: usize, reason: &'static str },

    /// Gradient step size needs to be positive and finite.
    InvalidStepSize { step: f64, reason: &'static str },

    // ---- Cost function ----
    /// Cost function returned a non-finite value.
    NonFiniteCost { value: f64 },

    // ---- Optimizer outcome ----
    /// Estimated parameters must be finite.
    InvalidThetaHat { index: usize, value: f64, reason: &'static str },

    /// Best parameter vector is missing from the solver state.
    MissingThetaHat,

    // ---- Backend ----
    /// Error surfaced by the argmin runtime (line search, executor, ...).
    Backend { message: String },
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptError::GradientNotImplemented => {
                write!(f, "No analytic gradient implemented; use finite differences.")
            }
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient has dimension {found}; expected {expected}.")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Gradient entry {index} is invalid ({value}). {reason}")
            }
            OptError::ThetaDimMismatch { expected, found } => {
                write!(f, "Parameter vector has dimension {found}; expected {expected}.")
            }
            OptError::InvalidTheta0 { index, value, reason } => {
                write!(f, "Initial parameter {index} is invalid ({value}). {reason}")
            }
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}. {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid cost tolerance {tol}. {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid iteration cap {max_iter}. {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "At least one of tol_grad, tol_cost, or max_iter must be provided.")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Unknown line searcher '{name}'. {reason}")
            }
            OptError::InvalidLbfgsMem { mem, reason } => {
                write!(f, "Invalid L-BFGS memory {mem}. {reason}")
            }
            OptError::InvalidStepSize { step, reason } => {
                write!(f, "Invalid gradient step size {step}. {reason}")
            }
            OptError::NonFiniteCost { value } => {
                write!(f, "Objective returned a non-finite value: {value}")
            }
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Estimated parameter {index} is invalid ({value}). {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Solver state holds no best parameter vector.")
            }
            OptError::Backend { message } => {
                write!(f, "Optimizer backend error: {message}")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(err: Error) -> Self {
        match err.downcast::<OptError>() {
            Ok(opt_err) => opt_err,
            Err(err) => OptError::Backend { message: err.to_string() },
        }
    }
}
