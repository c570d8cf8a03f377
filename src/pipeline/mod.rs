//! Pipeline orchestration — fetch, normalize, fit, simulate, calibrate,
//! and summarize in one call.
//!
//! Purpose
//! -------
//! [`run_forecast`] wires the crate's stages together behind a single
//! request/outcome surface. The stages themselves stay independent; this
//! module owns only sequencing, the two graceful degradations, and the
//! unified error type.
//!
//! Key behaviors
//! -------------
//! - A structural-model failure of any kind is caught: the pipeline logs a
//!   warning, records [`Warning::StructuralFallback`], and refits with the
//!   classical SARIMA model. Only a SARIMA failure is fatal.
//! - A calibration failure (no target overlap, non-convergence) degrades
//!   to uniform weights with [`Warning::CalibrationSkipped`] rather than
//!   aborting a run whose simulations are already valid.
//! - All other failures map into [`ForecastError`] and abort.
pub mod errors;
pub mod source;

pub use errors::{ForecastError, ForecastResult, Warning};
pub use source::{ApiKey, CredentialError, SeriesSource, SourceError};

use std::str::FromStr;

use crate::calibrate::{
    AnnualTargets, CalibrationOptions, PathWeights, calibrate_ensemble,
};
use crate::model::{
    PathSimulator, PosteriorDraws, SarimaSpec, StructuralSpec,
};
use crate::series::{NormalizerOptions, Quarter, QuarterlySeries};
use crate::simulate::{ConfigError, SimulationEnsemble, generate_ensemble};
use crate::summary::{ForecastSummary, SummaryOptions, summarize};

/// Which model family fits the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelChoice {
    #[default]
    Sarima,
    Structural,
}

impl FromStr for ModelChoice {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sarima" => Ok(ModelChoice::Sarima),
            "structural" | "bayesian" => Ok(ModelChoice::Structural),
            _ => Err(ConfigError::UnknownModel { literal: s.to_string() }),
        }
    }
}

/// One forecast run's user-facing parameters.
///
/// Defaults reproduce the reference deployment: the GFDEBTN federal-debt
/// series, the classical model, 1000 calibrated simulations through
/// 2028Q4, seed 42, and 50 paths marked for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub series_id: String,
    pub model: ModelChoice,
    pub calibrate: bool,
    pub n_simulations: usize,
    pub display_paths: usize,
    pub end_period: Quarter,
    pub seed: u64,
}

impl Default for ForecastRequest {
    fn default() -> Self {
        Self {
            series_id: "GFDEBTN".to_string(),
            model: ModelChoice::Sarima,
            calibrate: true,
            n_simulations: 1000,
            display_paths: 50,
            end_period: Quarter::new(2028, 4),
            seed: 42,
        }
    }
}

impl ForecastRequest {
    /// Set the end period from a `YYYYQN` literal.
    ///
    /// # Errors
    /// - [`ConfigError::InvalidEndPeriod`] for unparsable literals.
    pub fn with_end_period_str(mut self, literal: &str) -> Result<Self, ConfigError> {
        self.end_period = Quarter::parse(literal).map_err(ConfigError::from)?;
        Ok(self)
    }
}

/// Stage-level tuning knobs, independent of any single request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineConfig {
    pub normalizer: NormalizerOptions,
    pub sarima: SarimaSpec,
    pub structural: StructuralSpec,
    pub calibration: CalibrationOptions,
    pub summary: SummaryOptions,
}

/// Everything a forecast run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastOutcome {
    /// Normalized in-sample series.
    pub series: QuarterlySeries,
    /// Time-major simulation ensemble.
    pub ensemble: SimulationEnsemble,
    /// Calibrated (or uniform) path weights.
    pub weights: PathWeights,
    /// Distributional summary of the weighted ensemble.
    pub summary: ForecastSummary,
    /// Posterior draws, present only for a successful structural fit.
    pub posterior: Option<PosteriorDraws>,
    /// Non-fatal degradations encountered during the run.
    pub warnings: Vec<Warning>,
    /// Number of paths the caller asked to display, clamped to the
    /// ensemble size.
    pub display_paths: usize,
}

/// Run the full forecast pipeline.
///
/// # Errors
/// Any stage failure not covered by the two graceful degradations, as a
/// [`ForecastError`]; see the module notes for which failures degrade.
pub fn run_forecast(
    source: &dyn SeriesSource, request: &ForecastRequest, targets: &AnnualTargets,
    config: &PipelineConfig,
) -> ForecastResult<ForecastOutcome> {
    if request.n_simulations < 1 {
        return Err(ConfigError::InvalidSimulationCount { n: request.n_simulations }.into());
    }

    let raw = source.fetch(&request.series_id)?;
    let series = QuarterlySeries::from_raw(&raw, &config.normalizer)?;
    log::info!(
        "normalized {} ({} quarters, {}..{})",
        request.series_id,
        series.len(),
        series.first_period(),
        series.last_period()
    );

    let mut warnings = Vec::new();
    let mut posterior = None;
    let model: Box<dyn PathSimulator> = match request.model {
        ModelChoice::Sarima => Box::new(config.sarima.fit(&series)?),
        ModelChoice::Structural => match config.structural.fit(&series) {
            Ok(fit) => {
                posterior = Some(fit.posterior().clone());
                Box::new(fit)
            }
            Err(err) => {
                let message = err.to_string();
                log::warn!("structural fit failed ({message}); falling back to SARIMA");
                warnings.push(Warning::StructuralFallback { message });
                Box::new(config.sarima.fit(&series)?)
            }
        },
    };

    let ensemble = generate_ensemble(
        model.as_ref(),
        &series,
        request.end_period,
        request.n_simulations,
        request.seed,
    )?;

    let weights = if request.calibrate {
        match calibrate_ensemble(&ensemble, targets, &config.calibration) {
            Ok(weights) => weights,
            Err(err) => {
                let message = err.to_string();
                log::warn!("calibration failed ({message}); using uniform weights");
                warnings.push(Warning::CalibrationSkipped { message });
                PathWeights::uniform(request.n_simulations)
            }
        }
    } else {
        PathWeights::uniform(request.n_simulations)
    };

    let summary = summarize(&ensemble, &weights, &config.summary);
    let display_paths = request.display_paths.min(request.n_simulations);

    Ok(ForecastOutcome {
        series,
        ensemble,
        weights,
        summary,
        posterior,
        warnings,
        display_paths,
    })
}
