//! Integration tests for the end-to-end forecast pipeline.
//!
//! Purpose
//! -------
//! - Validate the full chain: raw observations, through normalization,
//!   model fitting, and ensemble simulation, to calibrated weights and
//!   the distributional summary.
//! - Exercise realistic series shapes (a growing, seasonal debt-like
//!   series at raw provider scale) rather than toy edge cases only.
//!
//! Coverage
//! --------
//! - `pipeline::run_forecast`:
//!   - The default SARIMA path with calibration, including shape,
//!     index-alignment, and seed-reproducibility guarantees.
//!   - The structural-to-classical fallback and its recorded warning.
//!   - Calibration degradation to uniform weights on no target overlap.
//!   - Fatal configuration and data-source errors.
//! - `pipeline::source::ApiKey`:
//!   - Credential failure surfaced through the pipeline error type.
//!
//! Exclusions
//! ----------
//! - Fine-grained behavior of the normalizer, fitters, solvers, and
//!   summarizer — covered by unit tests in their modules.
//! - Live provider access — the source trait is exercised with synthetic
//!   implementations only.
use std::collections::BTreeMap;

use chrono::NaiveDate;
use fred_forecaster::calibrate::AnnualTargets;
use fred_forecaster::pipeline::{
    ApiKey, ForecastError, ForecastRequest, ModelChoice, PipelineConfig, SeriesSource,
    SourceError, Warning, run_forecast,
};
use fred_forecaster::model::structural::StructuralOptions;
use fred_forecaster::series::RawObservation;
use fred_forecaster::simulate::ConfigError;
use fred_forecaster::Quarter;

/// Serves a deterministic debt-like monthly series at raw provider scale
/// (millions): trend, quarterly seasonality, and a mild wobble, ending in
/// December 2023.
struct SyntheticDebtSource;

impl SeriesSource for SyntheticDebtSource {
    fn fetch(&self, _series_id: &str) -> Result<Vec<RawObservation>, SourceError> {
        let mut observations = Vec::new();
        let mut quarter_count = 0usize;
        for year in 2010..=2023 {
            for month in 1..=12u32 {
                let seasonal = [0.45, -0.15, 0.25, -0.55][(month as usize - 1) / 3];
                let wobble = (quarter_count as f64 * 0.8).sin() * 0.1;
                let level = 15.0 + 0.35 * quarter_count as f64 + seasonal + wobble;
                let date = NaiveDate::from_ymd_opt(year, month, 15)
                    .ok_or_else(|| SourceError::Upstream {
                        message: "bad synthetic date".to_string(),
                    })?;
                observations.push(RawObservation { date, value: level * 1e6 });
                if month % 3 == 0 {
                    quarter_count += 1;
                }
            }
        }
        Ok(observations)
    }
}

/// A source that always fails with a credential error.
struct UnauthenticatedSource;

impl SeriesSource for UnauthenticatedSource {
    fn fetch(&self, _series_id: &str) -> Result<Vec<RawObservation>, SourceError> {
        let err = ApiKey::from_env("FRED_FORECASTER_INTEGRATION_UNSET_KEY").unwrap_err();
        Err(err.into())
    }
}

/// Targets bracketing the synthetic series' trend so calibration has a
/// feasible fit inside the simulated fan.
fn reachable_targets() -> AnnualTargets {
    // The series ends 2023Q4 near level 34.5 growing ~1.4/year.
    AnnualTargets::new(
        BTreeMap::from([(2024, 35.3), (2025, 36.7), (2026, 38.1)]),
        4,
    )
    .unwrap()
}

fn small_request() -> ForecastRequest {
    ForecastRequest {
        n_simulations: 200,
        end_period: Quarter::new(2026, 4),
        ..ForecastRequest::default()
    }
}

fn quick_structural_config() -> PipelineConfig {
    PipelineConfig {
        structural: fred_forecaster::StructuralSpec {
            options: StructuralOptions {
                chains: 2,
                draws: 10,
                burn_in: 10,
                rhat_threshold: 100.0,
                ..StructuralOptions::default()
            },
        },
        ..PipelineConfig::default()
    }
}

#[test]
// Purpose
// -------
// Run the default SARIMA pipeline with calibration and verify the
// outcome's structural guarantees end to end.
//
// Given
// -----
// - 14 years of synthetic monthly observations ending December 2023.
// - 200 simulations through 2026Q4 with reachable Q4 targets.
//
// Expect
// ------
// - A 56-quarter normalized series in trillions ending 2023Q4.
// - A (12, 200) ensemble indexed 2024Q1..2026Q4.
// - Feasible weights, aligned summary vectors, and probabilities in [0, 1].
fn sarima_pipeline_end_to_end() {
    let outcome = run_forecast(
        &SyntheticDebtSource,
        &small_request(),
        &reachable_targets(),
        &PipelineConfig::default(),
    )
    .unwrap();

    assert_eq!(outcome.series.len(), 56);
    assert_eq!(outcome.series.last_period(), Quarter::new(2023, 4));
    // Raw millions landed in trillions after normalization.
    assert!(outcome.series.values()[55] > 30.0 && outcome.series.values()[55] < 40.0);

    assert_eq!(outcome.ensemble.steps(), 12);
    assert_eq!(outcome.ensemble.n_paths(), 200);
    assert_eq!(outcome.ensemble.index()[0], Quarter::new(2024, 1));
    assert_eq!(outcome.ensemble.index()[11], Quarter::new(2026, 4));

    // Calibration must actually succeed at this scale; a uniform-weight
    // fallback would surface here as a CalibrationSkipped warning.
    assert!(outcome.warnings.is_empty(), "warnings: {:?}", outcome.warnings);

    let weights = outcome.weights.as_array();
    assert_eq!(weights.len(), 200);
    assert!(weights.iter().all(|&w| w >= 0.0));
    assert!((weights.sum() - 1.0).abs() < 1e-9);

    assert_eq!(outcome.summary.mean_path.len(), 12);
    assert_eq!(outcome.summary.lower_band.len(), 12);
    assert_eq!(outcome.summary.upper_band.len(), 12);
    for row in 0..12 {
        assert!(outcome.summary.lower_band[row] <= outcome.summary.upper_band[row]);
    }
    assert!((0.0..=1.0).contains(&outcome.summary.overall_decline));
    assert!((0.0..=1.0).contains(&outcome.summary.windowed_decline));
    for &(quarter, probability) in &outcome.summary.quarterly_decline {
        assert!(quarter.year() >= 2025);
        assert!((0.0..=1.0).contains(&probability));
    }

    assert!(outcome.posterior.is_none());
    assert_eq!(outcome.display_paths, 50);
}

#[test]
// Purpose
// -------
// Identical requests must produce identical outcomes: the entire pipeline
// is deterministic given the seed.
fn pipeline_is_reproducible_for_identical_seeds() {
    let run = || {
        run_forecast(
            &SyntheticDebtSource,
            &small_request(),
            &reachable_targets(),
            &PipelineConfig::default(),
        )
        .unwrap()
    };
    let first = run();
    let second = run();
    assert_eq!(first.ensemble.values(), second.ensemble.values());
    assert_eq!(first.weights.as_array(), second.weights.as_array());
    assert_eq!(first.summary, second.summary);

    let reseeded = run_forecast(
        &SyntheticDebtSource,
        &ForecastRequest { seed: 7, ..small_request() },
        &reachable_targets(),
        &PipelineConfig::default(),
    )
    .unwrap();
    assert_ne!(first.ensemble.values(), reseeded.ensemble.values());
}

#[test]
// Purpose
// -------
// A successful structural fit must surface its posterior draws alongside
// the ensemble.
fn structural_pipeline_exposes_posterior_draws() {
    let request = ForecastRequest {
        model: ModelChoice::Structural,
        calibrate: false,
        n_simulations: 40,
        end_period: Quarter::new(2025, 4),
        ..ForecastRequest::default()
    };

    let outcome = run_forecast(
        &SyntheticDebtSource,
        &request,
        &reachable_targets(),
        &quick_structural_config(),
    )
    .unwrap();

    let posterior = outcome.posterior.expect("structural run should carry draws");
    assert_eq!(posterior.n_draws(), 20);
    assert_eq!(posterior.periods().len(), 56);
    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.ensemble.steps(), 8);
    assert_eq!(outcome.ensemble.n_paths(), 40);
}

#[test]
// Purpose
// -------
// An R-hat gate at exactly 1.0 rejects any finite sampler run, forcing
// the structural-to-classical fallback; the run still succeeds and
// records why.
fn structural_failure_falls_back_to_sarima() {
    let mut config = quick_structural_config();
    config.structural.options.rhat_threshold = 1.0;
    let request = ForecastRequest {
        model: ModelChoice::Structural,
        n_simulations: 100,
        end_period: Quarter::new(2025, 4),
        ..ForecastRequest::default()
    };

    let outcome =
        run_forecast(&SyntheticDebtSource, &request, &reachable_targets(), &config).unwrap();

    assert!(outcome.posterior.is_none());
    assert!(outcome
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::StructuralFallback { .. })));
    assert_eq!(outcome.ensemble.n_paths(), 100);
}

#[test]
// Purpose
// -------
// Targets entirely outside the horizon degrade calibration to uniform
// weights with a recorded warning instead of aborting the run.
fn missing_target_overlap_degrades_to_uniform_weights() {
    let unreachable =
        AnnualTargets::new(BTreeMap::from([(2050, 99.0)]), 4).unwrap();

    let outcome = run_forecast(
        &SyntheticDebtSource,
        &small_request(),
        &unreachable,
        &PipelineConfig::default(),
    )
    .unwrap();

    assert!(outcome
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::CalibrationSkipped { .. })));
    let weights = outcome.weights.as_array();
    let uniform = 1.0 / 200.0;
    assert!(weights.iter().all(|&w| (w - uniform).abs() < 1e-12));
}

#[test]
fn zero_simulations_is_a_fatal_configuration_error() {
    let request = ForecastRequest { n_simulations: 0, ..small_request() };
    let err = run_forecast(
        &SyntheticDebtSource,
        &request,
        &reachable_targets(),
        &PipelineConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ForecastError::Config(ConfigError::InvalidSimulationCount { n: 0 })
    ));
}

#[test]
fn missing_credentials_abort_the_run() {
    let err = run_forecast(
        &UnauthenticatedSource,
        &small_request(),
        &reachable_targets(),
        &PipelineConfig::default(),
    )
    .unwrap_err();
    match err {
        ForecastError::Source(SourceError::Credential(credential)) => {
            assert!(credential
                .to_string()
                .contains("FRED_FORECASTER_INTEGRATION_UNSET_KEY"));
        }
        other => panic!("expected a credential failure, got {other:?}"),
    }
}
