//! Forecast horizon: the contiguous run of quarters between the end of the
//! sample and a requested end period, inclusive.
use crate::series::Quarter;
use crate::simulate::errors::{ConfigError, ConfigResult};

/// A non-empty quarterly forecast horizon.
///
/// Constructed relative to the last in-sample period so the first forecast
/// step is always the quarter immediately after the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastHorizon {
    start: Quarter,
    steps: usize,
}

impl ForecastHorizon {
    /// Build the horizon covering `last_period.succ()` through `end`
    /// inclusive.
    ///
    /// # Errors
    /// - [`ConfigError::EmptyHorizon`] when `end` does not lie strictly
    ///   after `last_period`.
    pub fn after(last_period: Quarter, end: Quarter) -> ConfigResult<Self> {
        let start = last_period.succ();
        let steps = end.ordinal() - start.ordinal() + 1;
        if steps < 1 {
            return Err(ConfigError::EmptyHorizon {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, steps: steps as usize })
    }

    /// First forecast quarter.
    pub fn start(&self) -> Quarter {
        self.start
    }

    /// Last forecast quarter.
    pub fn end(&self) -> Quarter {
        Quarter::from_ordinal(self.start.ordinal() + self.steps as i64 - 1)
    }

    /// Number of forecast steps.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// The full quarterly index, in order.
    pub fn index(&self) -> Vec<Quarter> {
        (0..self.steps as i64)
            .map(|offset| Quarter::from_ordinal(self.start.ordinal() + offset))
            .collect()
    }
}
