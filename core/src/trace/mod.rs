pub mod bounds;
pub mod series;

pub use bounds::AxisBounds;
pub use series::{SimulationTrace, TraceSummary};
