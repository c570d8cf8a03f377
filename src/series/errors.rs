//! Errors for series normalization (raw-observation validation, resampling,
//! and quarterly-period parsing).
//!
//! This module defines a data error type, [`DataError`], raised at the
//! normalizer boundary, and a parse error type, [`PeriodParseError`], for
//! `YYYYQN` quarter literals. Both implement `Display`/`Error`.
//!
//! ## Conventions
//! - A quarterly series must be **contiguous and ascending** with exactly one
//!   finite value per quarter.
//! - The minimum history requirement is expressed in quarters (two full
//!   seasonal cycles, i.e. 8, by default).
//! - Data errors are not recoverable without new input; callers surface them
//!   rather than retrying.
use crate::series::period::Quarter;

/// Result alias for normalizer operations that may produce [`DataError`].
pub type DataResult<T> = Result<T, DataError>;

/// Unified error type for series normalization.
///
/// Covers empty/short histories, non-finite observations, and gaps in the
/// resampled quarterly index.
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// No observations survived resampling.
    EmptySeries,

    /// A resampled value is NaN/±inf.
    NonFiniteValue { period: Quarter, value: f64 },

    /// Two consecutive resampled quarters are not adjacent.
    NonContiguous { prev: Quarter, next: Quarter },

    /// Fewer quarters than the model-fitting minimum.
    InsufficientHistory { required: usize, actual: usize },
}

impl std::error::Error for DataError {}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::EmptySeries => {
                write!(f, "No observations available after quarterly resampling.")
            }
            DataError::NonFiniteValue { period, value } => {
                write!(f, "Value for {period} is non-finite: {value}")
            }
            DataError::NonContiguous { prev, next } => {
                write!(f, "Gap in quarterly series between {prev} and {next}.")
            }
            DataError::InsufficientHistory { required, actual } => {
                write!(
                    f,
                    "Need at least {required} quarters of history for model fitting; got {actual}."
                )
            }
        }
    }
}

/// Error type for parsing `YYYYQN` quarter literals (e.g. `2028Q4`).
#[derive(Debug, Clone, PartialEq)]
pub enum PeriodParseError {
    /// Literal does not match the `YYYYQN` shape.
    BadFormat { literal: String },

    /// Quarter number is outside 1–4.
    BadQuarter { literal: String, quarter: u32 },
}

impl std::error::Error for PeriodParseError {}

impl std::fmt::Display for PeriodParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeriodParseError::BadFormat { literal } => {
                write!(f, "Expected a period of the form YYYYQN (e.g. 2028Q4); got '{literal}'.")
            }
            PeriodParseError::BadQuarter { literal, quarter } => {
                write!(f, "Quarter number in '{literal}' must be 1-4; got {quarter}.")
            }
        }
    }
}
