//! Errors for target definition and weight calibration.
use crate::series::Quarter;

/// Result alias for calibration operations.
pub type CalibrationResult<T> = Result<T, CalibrationError>;

#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// No target year's reference quarter falls inside the forecast index.
    NoTargetOverlap { first: Quarter, last: Quarter },

    /// The constrained solver hit its iteration cap without converging.
    DidNotConverge { status: String },

    /// The constrained solver raised before producing weights.
    SolverFailure { message: String },

    /// A supplied weight violates non-negativity or finiteness.
    InvalidWeight { index: usize, value: f64, reason: &'static str },

    /// Supplied weights do not sum to one within tolerance.
    SumMismatch { sum: f64 },

    /// Target reference quarter outside 1..=4.
    InvalidReferenceQuarter { quarter: u8 },

    /// A target level is NaN or infinite.
    NonFiniteTarget { year: i32, value: f64 },
}

impl std::error::Error for CalibrationError {}

impl std::fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalibrationError::NoTargetOverlap { first, last } => {
                write!(
                    f,
                    "No calibration target overlaps the forecast index {first}..{last}."
                )
            }
            CalibrationError::DidNotConverge { status } => {
                write!(f, "Weight calibration did not converge: {status}")
            }
            CalibrationError::SolverFailure { message } => {
                write!(f, "Weight calibration solver failed: {message}")
            }
            CalibrationError::InvalidWeight { index, value, reason } => {
                write!(f, "Weight {index} has invalid value {value}: {reason}")
            }
            CalibrationError::SumMismatch { sum } => {
                write!(f, "Weights sum to {sum}, expected 1.")
            }
            CalibrationError::InvalidReferenceQuarter { quarter } => {
                write!(f, "Reference quarter must be 1..=4; got {quarter}.")
            }
            CalibrationError::NonFiniteTarget { year, value } => {
                write!(f, "Target level for {year} is not finite: {value}.")
            }
        }
    }
}
