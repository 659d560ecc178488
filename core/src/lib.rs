//! Numeric core for the clutch servo simulation.
//!
//! A raw position signal is smoothed, mapped through a piecewise-linear
//! duty-cycle curve and compared against a rate-limited servo ramp. Each
//! step is a `ProcessingStage` so drivers can chain them the same way.

pub mod curve;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;
pub mod trace;

pub use prelude::{ProcessingStage, StageInput, StageOutput};
