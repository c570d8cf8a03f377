//! Errors for model fitting (SARIMA maximum likelihood and the Bayesian
//! structural sampler).
//!
//! [`FitError`] is the catchable boundary for the structural-to-classical
//! fallback: the pipeline catches any variant raised by the structural
//! fitter, reports it, and refits with the classical model.
use crate::optimization::errors::OptError;

/// Result alias for fitting operations that may produce [`FitError`].
pub type FitResult<T> = Result<T, FitError>;

#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    // ---- Input validation ----
    /// Differenced series too short for the likelihood recursion.
    SeriesTooShort { required: usize, actual: usize },

    /// Series has no usable variation (e.g. constant after differencing).
    DegenerateSeries { reason: &'static str },

    /// Requested model orders fall outside what the recursion supports.
    UnsupportedOrders { reason: &'static str },

    /// Sampler configuration is invalid (chains, draws, priors, thresholds).
    InvalidSamplerOptions { reason: &'static str },

    // ---- Estimation ----
    /// Optimizer raised while maximizing the likelihood.
    Optimization { status: String },

    /// Optimizer terminated without reporting convergence.
    DidNotConverge { status: String },

    /// Posterior chains failed the potential-scale-reduction gate.
    ChainsNotConverged { rhat: f64, threshold: f64 },

    /// Linear algebra or distribution setup failed mid-fit.
    NumericalFailure { context: &'static str },

    /// Fit holds no posterior draws to simulate from.
    NoPosteriorDraws,
}

impl std::error::Error for FitError {}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitError::SeriesTooShort { required, actual } => {
                write!(
                    f,
                    "Differenced series has {actual} observations; need at least {required}."
                )
            }
            FitError::DegenerateSeries { reason } => {
                write!(f, "Series is degenerate for fitting: {reason}")
            }
            FitError::UnsupportedOrders { reason } => {
                write!(f, "Unsupported model orders: {reason}")
            }
            FitError::InvalidSamplerOptions { reason } => {
                write!(f, "Invalid sampler options: {reason}")
            }
            FitError::Optimization { status } => {
                write!(f, "Likelihood optimization failed: {status}")
            }
            FitError::DidNotConverge { status } => {
                write!(f, "Likelihood optimization did not converge: {status}")
            }
            FitError::ChainsNotConverged { rhat, threshold } => {
                write!(
                    f,
                    "Posterior chains did not mix: max R-hat {rhat:.3} exceeds {threshold:.3}."
                )
            }
            FitError::NumericalFailure { context } => {
                write!(f, "Numerical failure during fitting: {context}")
            }
            FitError::NoPosteriorDraws => {
                write!(f, "No posterior draws available for predictive simulation.")
            }
        }
    }
}

impl From<OptError> for FitError {
    fn from(err: OptError) -> Self {
        FitError::Optimization { status: err.to_string() }
    }
}
