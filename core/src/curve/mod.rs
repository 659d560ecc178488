pub mod piecewise;

pub use piecewise::{Band, Breakpoint, CurveConfig, DutyCurve, Segment};
