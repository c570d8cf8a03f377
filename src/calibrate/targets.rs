//! Annual calibration targets: one level per calendar year, matched at a
//! fixed reference quarter of the forecast index.
use std::collections::BTreeMap;

use crate::calibrate::errors::{CalibrationError, CalibrationResult};

/// Validated annual target levels, in the same units as the normalized
/// series (trillions for the reference deployment).
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualTargets {
    levels: BTreeMap<i32, f64>,
    reference_quarter: u8,
}

impl AnnualTargets {
    /// Build a validated target set.
    ///
    /// # Errors
    /// - [`CalibrationError::InvalidReferenceQuarter`] for a quarter outside
    ///   `1..=4`.
    /// - [`CalibrationError::NonFiniteTarget`] for NaN/infinite levels.
    pub fn new(levels: BTreeMap<i32, f64>, reference_quarter: u8) -> CalibrationResult<Self> {
        if !(1..=4).contains(&reference_quarter) {
            return Err(CalibrationError::InvalidReferenceQuarter {
                quarter: reference_quarter,
            });
        }
        for (&year, &value) in &levels {
            if !value.is_finite() {
                return Err(CalibrationError::NonFiniteTarget { year, value });
            }
        }
        Ok(Self { levels, reference_quarter })
    }

    /// CBO baseline debt projections (February 2024), trillions of dollars,
    /// matched at fourth quarters.
    pub fn cbo_2024() -> Self {
        let levels = BTreeMap::from([
            (2024, 35.230),
            (2025, 37.209),
            (2026, 39.130),
            (2027, 40.872),
            (2028, 42.748),
        ]);
        // Hard-coded table is finite and the quarter is in range.
        Self { levels, reference_quarter: 4 }
    }

    /// Target level for `year`, if defined.
    pub fn get(&self, year: i32) -> Option<f64> {
        self.levels.get(&year).copied()
    }

    /// Target years, ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.levels.keys().copied()
    }

    /// The quarter (1..=4) at which targets are matched.
    pub fn reference_quarter(&self) -> u8 {
        self.reference_quarter
    }

    /// Number of targets.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the target set is empty.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
