//! Quarterly series normalization — resample raw observations into a
//! canonical quarterly-period series.
//!
//! Purpose
//! -------
//! Convert a raw, arbitrarily-timestamped numeric series (as delivered by the
//! upstream data collaborator) into a [`QuarterlySeries`]: one value per
//! calendar quarter, contiguous and ascending, scaled to the canonical unit.
//!
//! Key behaviors
//! -------------
//! - Resample with **last-observation-per-quarter** semantics (not mean),
//!   anchored to calendar quarters ending March/June/September/December.
//! - Divide every value by a fixed unit divisor (default `1e6`, millions to
//!   trillions).
//! - Reject empty output, non-finite values, gaps between quarters, and
//!   histories shorter than the model-fitting minimum via [`DataError`].
//!
//! Invariants & assumptions
//! ------------------------
//! - A constructed [`QuarterlySeries`] always has strictly ascending,
//!   gap-free periods and one finite value per period.
//! - The series is read-only after construction; downstream consumers hold
//!   shared references for the lifetime of a forecast request.
//!
//! Conventions
//! -----------
//! - Raw input order does not matter; observations are bucketed by quarter
//!   and the observation with the latest date in each bucket wins.
//! - The minimum history default is 8 quarters: two full seasonal cycles,
//!   enough to estimate seasonal differencing.
use std::collections::BTreeMap;

use chrono::NaiveDate;
use ndarray::Array1;

use crate::series::{
    errors::{DataError, DataResult},
    period::Quarter,
};

/// A single raw observation from the upstream data collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawObservation {
    pub date: NaiveDate,
    pub value: f64,
}

/// Configuration for quarterly resampling.
///
/// Fields:
/// - `unit_divisor`: fixed scale factor applied as `value / unit_divisor`
///   (default `1e6`, turning millions into trillions).
/// - `min_observations`: minimum number of resampled quarters required for
///   model fitting (default 8, two seasonal cycles).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizerOptions {
    pub unit_divisor: f64,
    pub min_observations: usize,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self { unit_divisor: 1e6, min_observations: 8 }
    }
}

/// Canonical quarterly series: contiguous ascending periods with one finite
/// value per quarter, in the canonical unit.
///
/// Created once per forecast request by [`QuarterlySeries::from_raw`] and
/// read-only afterward. The fitter consumes `values`, the simulation
/// generator anchors on `last_period` and the trailing values.
#[derive(Debug, Clone, PartialEq)]
pub struct QuarterlySeries {
    periods: Vec<Quarter>,
    values: Array1<f64>,
}

impl QuarterlySeries {
    /// Build a series from already-quarterly `(period, value)` pairs.
    ///
    /// Validates the [`QuarterlySeries`] invariants (non-empty, finite
    /// values, contiguous ascending periods) but not the history minimum,
    /// which is a resampling concern.
    ///
    /// # Errors
    /// - [`DataError::EmptySeries`] when `pairs` is empty.
    /// - [`DataError::NonFiniteValue`] when a value is NaN/±inf.
    /// - [`DataError::NonContiguous`] when consecutive periods are not
    ///   adjacent quarters in ascending order.
    pub fn new(pairs: Vec<(Quarter, f64)>) -> DataResult<Self> {
        if pairs.is_empty() {
            return Err(DataError::EmptySeries);
        }
        for window in pairs.windows(2) {
            let (prev, next) = (window[0].0, window[1].0);
            if next.ordinal() != prev.ordinal() + 1 {
                return Err(DataError::NonContiguous { prev, next });
            }
        }
        for &(period, value) in &pairs {
            if !value.is_finite() {
                return Err(DataError::NonFiniteValue { period, value });
            }
        }
        let (periods, values): (Vec<Quarter>, Vec<f64>) = pairs.into_iter().unzip();
        Ok(Self { periods, values: Array1::from_vec(values) })
    }

    /// Resample raw observations into a canonical quarterly series.
    ///
    /// Buckets observations by calendar quarter, keeps the observation with
    /// the latest date per bucket, scales by `opts.unit_divisor`, and sorts
    /// ascending.
    ///
    /// # Errors
    /// - [`DataError::EmptySeries`] when `raw` is empty.
    /// - [`DataError::NonFiniteValue`] when a surviving value is not finite.
    /// - [`DataError::NonContiguous`] when the resampled quarters have gaps.
    /// - [`DataError::InsufficientHistory`] when fewer than
    ///   `opts.min_observations` quarters survive.
    pub fn from_raw(raw: &[RawObservation], opts: &NormalizerOptions) -> DataResult<Self> {
        let mut buckets: BTreeMap<Quarter, (NaiveDate, f64)> = BTreeMap::new();
        for obs in raw {
            let quarter = Quarter::from_date(obs.date);
            match buckets.get(&quarter) {
                Some(&(kept_date, _)) if kept_date >= obs.date => {}
                _ => {
                    buckets.insert(quarter, (obs.date, obs.value));
                }
            }
        }

        let pairs: Vec<(Quarter, f64)> = buckets
            .into_iter()
            .map(|(quarter, (_, value))| (quarter, value / opts.unit_divisor))
            .collect();
        let series = Self::new(pairs)?;
        if series.len() < opts.min_observations {
            return Err(DataError::InsufficientHistory {
                required: opts.min_observations,
                actual: series.len(),
            });
        }
        Ok(series)
    }

    /// Number of quarters in the series.
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// True when the series holds no quarters. Constructed series are never
    /// empty; this exists for completeness of the container API.
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// The ascending quarterly periods.
    pub fn periods(&self) -> &[Quarter] {
        &self.periods
    }

    /// The values, aligned with [`QuarterlySeries::periods`].
    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// First (oldest) period.
    pub fn first_period(&self) -> Quarter {
        self.periods[0]
    }

    /// Last (newest) period; simulations anchor immediately after it.
    pub fn last_period(&self) -> Quarter {
        self.periods[self.periods.len() - 1]
    }

    /// The trailing `count` values, newest last.
    ///
    /// # Panics
    /// Panics if `count > len()`; callers are expected to have checked the
    /// history minimum.
    pub fn tail_values(&self, count: usize) -> Array1<f64> {
        let start = self.values.len() - count;
        self.values.slice(ndarray::s![start..]).to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Datelike;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Last-observation-per-quarter resampling, unit scaling, and sorting of
    //   unsorted raw input.
    // - Each DataError variant: empty input, non-finite values, quarter gaps,
    //   and insufficient history.
    //
    // They intentionally DO NOT cover model fitting on the resulting series;
    // the model module has its own coverage.
    // -------------------------------------------------------------------------

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn monthly_raw(start_year: i32, months: usize) -> Vec<RawObservation> {
        (0..months)
            .map(|i| {
                let year = start_year + (i / 12) as i32;
                let month = (i % 12) as u32 + 1;
                RawObservation { date: date(year, month, 15), value: 1_000_000.0 + i as f64 }
            })
            .collect()
    }

    #[test]
    // Purpose
    // -------
    // Verify that monthly raw data resamples to one value per quarter using
    // the latest observation in each quarter, scaled to the canonical unit.
    //
    // Given
    // -----
    // - 24 monthly observations over 2022-2023 with values 1_000_000 + i.
    //
    // Expect
    // ------
    // - 8 quarters, ascending from 2022Q1 to 2023Q4.
    // - Each quarter's value equals the last month of that quarter, divided
    //   by 1e6.
    fn from_raw_resamples_last_value_and_scales() {
        let raw = monthly_raw(2022, 24);
        let series = QuarterlySeries::from_raw(&raw, &NormalizerOptions::default()).unwrap();

        assert_eq!(series.len(), 8);
        assert_eq!(series.first_period(), Quarter::new(2022, 1));
        assert_eq!(series.last_period(), Quarter::new(2023, 4));
        // 2022Q1 keeps March (i = 2); 2023Q4 keeps December (i = 23).
        assert!((series.values()[0] - 1.000_002).abs() < 1e-12);
        assert!((series.values()[7] - 1.000_023).abs() < 1e-12);
    }

    #[test]
    fn from_raw_is_order_insensitive() {
        let mut raw = monthly_raw(2022, 24);
        raw.reverse();
        let sorted = QuarterlySeries::from_raw(&monthly_raw(2022, 24), &NormalizerOptions::default())
            .unwrap();
        let shuffled = QuarterlySeries::from_raw(&raw, &NormalizerOptions::default()).unwrap();
        assert_eq!(sorted, shuffled);
    }

    #[test]
    fn from_raw_rejects_empty_input() {
        let err = QuarterlySeries::from_raw(&[], &NormalizerOptions::default()).unwrap_err();
        assert_eq!(err, DataError::EmptySeries);
    }

    #[test]
    fn from_raw_rejects_short_history() {
        let raw = monthly_raw(2022, 12); // only 4 quarters
        let err = QuarterlySeries::from_raw(&raw, &NormalizerOptions::default()).unwrap_err();
        assert_eq!(err, DataError::InsufficientHistory { required: 8, actual: 4 });
    }

    #[test]
    fn from_raw_rejects_gaps() {
        let mut raw = monthly_raw(2022, 24);
        // Remove all of 2022Q3 (July-September).
        raw.retain(|obs| !(obs.date.month() >= 7 && obs.date.month() <= 9 && obs.date.year() == 2022));
        let err = QuarterlySeries::from_raw(&raw, &NormalizerOptions::default()).unwrap_err();
        assert_eq!(
            err,
            DataError::NonContiguous { prev: Quarter::new(2022, 2), next: Quarter::new(2022, 4) }
        );
    }

    #[test]
    fn from_raw_rejects_non_finite_values() {
        let mut raw = monthly_raw(2022, 24);
        raw[5].value = f64::NAN;
        let err = QuarterlySeries::from_raw(&raw, &NormalizerOptions::default()).unwrap_err();
        assert!(matches!(err, DataError::NonFiniteValue { .. }));
    }

    #[test]
    fn tail_values_returns_trailing_slice() {
        let raw = monthly_raw(2022, 24);
        let series = QuarterlySeries::from_raw(&raw, &NormalizerOptions::default()).unwrap();
        let tail = series.tail_values(3);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[2], series.values()[series.len() - 1]);
    }
}
