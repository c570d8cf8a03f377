//! fred_forecaster — simulate-and-calibrate forecasting of quarterly
//! economic series.
//!
//! Purpose
//! -------
//! Turn a raw upstream series (federal debt, in the reference deployment)
//! into a calibrated probabilistic forecast: normalize to quarters, fit a
//! classical SARIMA or Bayesian structural model, simulate a seeded
//! ensemble of forecast paths, reweight the paths against published
//! annual projections, and summarize the weighted distribution.
//!
//! Layout
//! ------
//! - [`series`]: quarterly periods and the raw-to-quarterly normalizer.
//! - [`optimization`]: L-BFGS likelihood maximization and the
//!   simplex-constrained least-squares solver.
//! - [`model`]: SARIMA and structural fitters behind
//!   [`model::PathSimulator`].
//! - [`simulate`]: forecast horizons and time-major ensembles.
//! - [`calibrate`]: annual targets, path weights, and the calibration
//!   engine.
//! - [`summary`]: weighted mean path, percentile bands, and decline
//!   probabilities.
//! - [`pipeline`]: end-to-end orchestration with graceful degradation.
//!
//! Entry points
//! ------------
//! Most callers need only [`pipeline::run_forecast`] with a
//! [`pipeline::SeriesSource`] implementation, a
//! [`pipeline::ForecastRequest`], and a target table such as
//! [`calibrate::AnnualTargets::cbo_2024`].
pub mod calibrate;
pub mod model;
pub mod optimization;
pub mod pipeline;
pub mod series;
pub mod simulate;
pub mod summary;

pub use calibrate::{AnnualTargets, PathWeights};
pub use model::{FitError, PathSimulator, SarimaSpec, StructuralSpec};
pub use pipeline::{
    ForecastError, ForecastOutcome, ForecastRequest, ModelChoice, PipelineConfig,
    run_forecast,
};
pub use series::{Quarter, QuarterlySeries, RawObservation};
pub use simulate::SimulationEnsemble;
pub use summary::{ForecastSummary, SummaryOptions};
