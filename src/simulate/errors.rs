//! Errors for forecast-horizon construction and ensemble generation.
use crate::model::errors::FitError;
use crate::series::errors::PeriodParseError;

/// Result alias for configuration checks that may produce [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Invalid simulation configuration supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The requested end period does not lie after the sample.
    EmptyHorizon { start: String, end: String },

    /// Fewer than one simulated path was requested.
    InvalidSimulationCount { n: usize },

    /// The end-period literal failed to parse.
    InvalidEndPeriod { literal: String, reason: String },

    /// Ensemble index length disagrees with the value matrix.
    IndexMismatch { rows: usize, len: usize },

    /// The requested model name is not recognized.
    UnknownModel { literal: String },
}

impl std::error::Error for ConfigError {}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EmptyHorizon { start, end } => {
                write!(f, "Forecast horizon is empty: end period {end} precedes {start}.")
            }
            ConfigError::InvalidSimulationCount { n } => {
                write!(f, "At least one simulated path is required; got {n}.")
            }
            ConfigError::InvalidEndPeriod { literal, reason } => {
                write!(f, "End period '{literal}' is invalid: {reason}")
            }
            ConfigError::IndexMismatch { rows, len } => {
                write!(
                    f,
                    "Ensemble index has {len} entries but the value matrix has {rows} rows."
                )
            }
            ConfigError::UnknownModel { literal } => {
                write!(
                    f,
                    "Unknown model '{literal}'; valid options are 'sarima' or 'structural'."
                )
            }
        }
    }
}

impl From<PeriodParseError> for ConfigError {
    fn from(err: PeriodParseError) -> Self {
        let literal = match &err {
            PeriodParseError::BadFormat { literal } => literal.clone(),
            PeriodParseError::BadQuarter { literal, .. } => literal.clone(),
        };
        ConfigError::InvalidEndPeriod { literal, reason: err.to_string() }
    }
}

/// Any failure during ensemble generation: bad configuration or a model
/// simulation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    Config(ConfigError),
    Fit(FitError),
}

impl std::error::Error for SimulationError {}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::Config(err) => write!(f, "{err}"),
            SimulationError::Fit(err) => write!(f, "{err}"),
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(err: ConfigError) -> Self {
        SimulationError::Config(err)
    }
}

impl From<FitError> for SimulationError {
    fn from(err: FitError) -> Self {
        SimulationError::Fit(err)
    }
}
