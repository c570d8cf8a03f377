//! Calibration — constrained least-squares reweighting of ensemble paths
//! against annual external targets.
//!
//! Purpose
//! -------
//! Tie the ensemble to published projections: [`AnnualTargets`] defines
//! the levels to hit and at which quarter, [`calibrate_ensemble`] solves
//! for [`PathWeights`] on the probability simplex, and the weights feed
//! the distributional summarizer.
pub mod engine;
pub mod errors;
pub mod targets;
pub mod weights;

pub use engine::{CalibrationOptions, calibrate_ensemble};
pub use errors::{CalibrationError, CalibrationResult};
pub use targets::AnnualTargets;
pub use weights::PathWeights;
