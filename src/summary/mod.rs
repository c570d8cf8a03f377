//! Distributional summarization — central path, uncertainty band, and
//! decline probabilities over a weighted ensemble.
//!
//! Purpose
//! -------
//! Reduce the `(steps, n_paths)` ensemble to reporting quantities: the
//! weight-aware mean path, unweighted percentile bands, and the share of
//! paths declining quarter over quarter.
//!
//! Key behaviors
//! -------------
//! - The mean path and decline probabilities use the calibrated weights;
//!   the percentile band does not. The band describes the raw simulation
//!   spread, so calibration shifts the center of the fan without
//!   reshaping its envelope.
//! - Decline probabilities are weight-dotted decline indicators,
//!   restricted to quarters from the cutoff year onward for the
//!   per-quarter table and the windowed aggregate.
//! - Percentiles interpolate linearly between order statistics, matching
//!   the behavior downstream consumers expect from standard numerical
//!   tooling.
use ndarray::{Array1, Array2, ArrayView1};

use crate::calibrate::PathWeights;
use crate::series::Quarter;
use crate::simulate::SimulationEnsemble;

/// Band and cutoff configuration for summarization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryOptions {
    pub lower_percentile: f64,
    pub upper_percentile: f64,
    /// First calendar year included in decline statistics.
    pub cutoff_year: i32,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self { lower_percentile: 5.0, upper_percentile: 95.0, cutoff_year: 2025 }
    }
}

/// Reporting quantities derived from a weighted ensemble.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSummary {
    /// Weighted mean level per forecast quarter.
    pub mean_path: Array1<f64>,
    /// Unweighted lower percentile per forecast quarter.
    pub lower_band: Array1<f64>,
    /// Unweighted upper percentile per forecast quarter.
    pub upper_band: Array1<f64>,
    /// Weighted per-quarter decline probability, quarters from the cutoff
    /// year on.
    pub quarterly_decline: Vec<(Quarter, f64)>,
    /// Weighted mass of paths declining at least once in the horizon.
    pub overall_decline: f64,
    /// Weighted mass of paths declining at least once from the cutoff
    /// year on.
    pub windowed_decline: f64,
}

/// Summarize a weighted ensemble.
///
/// The weights must cover exactly the ensemble's paths. A mismatched
/// length is a logic error upstream and panics in the weighted dot
/// product; callers pair the two from the same pipeline run.
pub fn summarize(
    ensemble: &SimulationEnsemble, weights: &PathWeights, opts: &SummaryOptions,
) -> ForecastSummary {
    let values = ensemble.values();
    let steps = ensemble.steps();

    let mut mean_path = Array1::zeros(steps);
    let mut lower_band = Array1::zeros(steps);
    let mut upper_band = Array1::zeros(steps);
    for row in 0..steps {
        let level_row = values.row(row);
        mean_path[row] = level_row.dot(weights.as_array());
        lower_band[row] = percentile(level_row, opts.lower_percentile);
        upper_band[row] = percentile(level_row, opts.upper_percentile);
    }

    let index = ensemble.index();
    let w = weights.as_array();
    let quarterly_decline = index
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, quarter)| quarter.year() >= opts.cutoff_year)
        .map(|(row, &quarter)| (quarter, decline_probability_at(values, w, row)))
        .collect();

    let overall_decline = any_decline_probability(values, w, 0);
    let window_start = index
        .iter()
        .position(|quarter| quarter.year() >= opts.cutoff_year)
        .unwrap_or(0);
    let windowed_decline = any_decline_probability(values, w, window_start);

    ForecastSummary {
        mean_path,
        lower_band,
        upper_band,
        quarterly_decline,
        overall_decline,
        windowed_decline,
    }
}

/// Weighted mass of paths whose value at `row` is strictly below their
/// value at `row - 1`.
fn decline_probability_at(values: &Array2<f64>, weights: &Array1<f64>, row: usize) -> f64 {
    (0..values.ncols())
        .filter(|&path| values[[row, path]] < values[[row - 1, path]])
        .map(|path| weights[path])
        .sum()
}

/// Weighted mass of paths with at least one strict quarter-over-quarter
/// decline in `values[start.., :]`. Fewer than two rows in the window
/// means no transition can decline.
fn any_decline_probability(values: &Array2<f64>, weights: &Array1<f64>, start: usize) -> f64 {
    let steps = values.nrows();
    if steps - start < 2 {
        return 0.0;
    }
    (0..values.ncols())
        .filter(|&path| {
            (start + 1..steps).any(|row| values[[row, path]] < values[[row - 1, path]])
        })
        .map(|path| weights[path])
        .sum()
}

/// Linear-interpolation percentile of `row` at `q` in `[0, 100]`.
fn percentile(row: ArrayView1<'_, f64>, q: f64) -> f64 {
    let mut sorted: Vec<f64> = row.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = q / 100.0 * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}
