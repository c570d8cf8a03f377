//! Pipeline-level error taxonomy and non-fatal warnings.
//!
//! [`ForecastError`] unifies every stage's failure type so `run_forecast`
//! returns a single error surface; [`Warning`] records the degradations
//! the pipeline survives (structural fallback, skipped calibration).
use crate::calibrate::CalibrationError;
use crate::model::FitError;
use crate::pipeline::source::SourceError;
use crate::series::errors::{DataError, PeriodParseError};
use crate::simulate::errors::{ConfigError, SimulationError};

/// Result alias for pipeline operations.
pub type ForecastResult<T> = Result<T, ForecastError>;

/// Any fatal failure across the forecast pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Raw data could not be normalized into a usable series.
    Data(DataError),

    /// Request or simulation configuration is invalid.
    Config(ConfigError),

    /// Model fitting failed (after any fallback).
    Fit(FitError),

    /// Calibration failed in a non-degradable way.
    Calibration(CalibrationError),

    /// The data source failed, including missing credentials.
    Source(SourceError),
}

impl std::error::Error for ForecastError {}

impl std::fmt::Display for ForecastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForecastError::Data(err) => write!(f, "{err}"),
            ForecastError::Config(err) => write!(f, "{err}"),
            ForecastError::Fit(err) => write!(f, "{err}"),
            ForecastError::Calibration(err) => write!(f, "{err}"),
            ForecastError::Source(err) => write!(f, "{err}"),
        }
    }
}

impl From<DataError> for ForecastError {
    fn from(err: DataError) -> Self {
        ForecastError::Data(err)
    }
}

impl From<ConfigError> for ForecastError {
    fn from(err: ConfigError) -> Self {
        ForecastError::Config(err)
    }
}

impl From<PeriodParseError> for ForecastError {
    fn from(err: PeriodParseError) -> Self {
        ForecastError::Config(err.into())
    }
}

impl From<FitError> for ForecastError {
    fn from(err: FitError) -> Self {
        ForecastError::Fit(err)
    }
}

impl From<CalibrationError> for ForecastError {
    fn from(err: CalibrationError) -> Self {
        ForecastError::Calibration(err)
    }
}

impl From<SourceError> for ForecastError {
    fn from(err: SourceError) -> Self {
        ForecastError::Source(err)
    }
}

impl From<SimulationError> for ForecastError {
    fn from(err: SimulationError) -> Self {
        match err {
            SimulationError::Config(config) => ForecastError::Config(config),
            SimulationError::Fit(fit) => ForecastError::Fit(fit),
        }
    }
}

/// A degradation the pipeline recovered from, surfaced alongside results.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// The structural fit failed and the classical model was used instead.
    StructuralFallback { message: String },

    /// Calibration failed and uniform weights were used instead.
    CalibrationSkipped { message: String },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::StructuralFallback { message } => {
                write!(f, "Structural model failed; fell back to SARIMA: {message}")
            }
            Warning::CalibrationSkipped { message } => {
                write!(f, "Calibration skipped; using uniform weights: {message}")
            }
        }
    }
}
