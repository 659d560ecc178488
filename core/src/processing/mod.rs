pub mod angle;
pub mod duty_cycle;
pub mod ramp;
pub mod smoothing;

pub use angle::{DutyAngleMap, DutyAngleStage};
pub use duty_cycle::DutyCycleStage;
pub use ramp::{AngleRamp, AngleRampStage};
pub use smoothing::{ExponentialFilter, SmoothingStage};
