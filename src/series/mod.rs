//! series — quarterly periods and the raw-to-quarterly normalizer.
//!
//! Purpose
//! -------
//! Provide the canonical time axis of the crate ([`Quarter`]) and the
//! normalizer that turns raw upstream observations into a validated
//! [`QuarterlySeries`] ready for model fitting.
//!
//! Key behaviors
//! -------------
//! - [`period`] defines calendar quarters, ordinal arithmetic, `YYYYQN`
//!   parsing, and date-to-quarter mapping.
//! - [`quarterly`] resamples raw observations with last-value-per-quarter
//!   semantics, applies the unit scale, and enforces the series invariants.
//! - [`errors`] centralizes [`DataError`] and [`PeriodParseError`].
//!
//! Downstream usage
//! ----------------
//! - The model fitter consumes [`QuarterlySeries::values`]; the simulation
//!   generator anchors on [`QuarterlySeries::last_period`]; the request layer
//!   parses end periods via [`Quarter::parse`].

pub mod errors;
pub mod period;
pub mod quarterly;

pub use self::errors::{DataError, DataResult, PeriodParseError};
pub use self::period::Quarter;
pub use self::quarterly::{NormalizerOptions, QuarterlySeries, RawObservation};
