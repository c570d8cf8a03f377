//! Data-source seam: credentials and the observation-fetching trait the
//! pipeline consumes.
use std::env;
use std::fmt;

use crate::series::RawObservation;

/// A data-provider API key.
///
/// Holds the secret without exposing it: `Debug` prints a redacted
/// placeholder so the key never leaks into logs or error chains.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    secret: String,
}

impl ApiKey {
    /// Read the key from the environment variable `var`.
    ///
    /// # Errors
    /// - [`CredentialError::Missing`] when the variable is unset or empty.
    pub fn from_env(var: &str) -> Result<Self, CredentialError> {
        match env::var(var) {
            Ok(secret) if !secret.trim().is_empty() => Ok(Self { secret }),
            _ => Err(CredentialError::Missing { var: var.to_string() }),
        }
    }

    /// Wrap an already-obtained secret.
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// The raw secret, for request construction only.
    pub fn expose(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// A required credential is unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    Missing { var: String },
}

impl std::error::Error for CredentialError {}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::Missing { var } => {
                write!(
                    f,
                    "Environment variable {var} is not set; a data-provider API key is required."
                )
            }
        }
    }
}

/// Failure while obtaining raw observations.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceError {
    /// Credential acquisition failed.
    Credential(CredentialError),

    /// The provider returned an error or unusable payload.
    Upstream { message: String },
}

impl std::error::Error for SourceError {}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Credential(err) => write!(f, "{err}"),
            SourceError::Upstream { message } => {
                write!(f, "Upstream data source failed: {message}")
            }
        }
    }
}

impl From<CredentialError> for SourceError {
    fn from(err: CredentialError) -> Self {
        SourceError::Credential(err)
    }
}

/// Anything that can produce raw observations for a series identifier.
///
/// The pipeline is generic over this seam so tests inject synthetic data
/// and production code wires an HTTP-backed provider client.
pub trait SeriesSource {
    fn fetch(&self, series_id: &str) -> Result<Vec<RawObservation>, SourceError>;
}
