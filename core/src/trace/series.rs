use crate::trace::bounds::AxisBounds;
use serde::{Deserialize, Serialize};

/// Run-level figures reported next to the plotted series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceSummary {
    pub filter_factor: f64,
    /// Period in samples of the strongest raw-signal component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant_period: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured_gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytic_gain: Option<f64>,
    pub clamped_duty: usize,
    pub saturated_ramp: usize,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// Every series of one simulation run, ready for plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationTrace {
    pub scenario: String,
    pub time: Vec<i64>,
    pub raw: Vec<f64>,
    pub filtered: Vec<f64>,
    pub duty_cycle: Vec<f64>,
    pub ramp_angle: Vec<f64>,
    pub commanded_angle: Vec<f64>,
    /// Breakpoints as fractions of total travel, `[position, duty]`.
    pub curve_shape: Vec<[f64; 2]>,
    pub position_bounds: AxisBounds,
    pub duty_bounds: AxisBounds,
    pub angle_bounds: AxisBounds,
    #[serde(default)]
    pub summary: TraceSummary,
}

impl SimulationTrace {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// True when every per-sample series matches the time axis.
    pub fn is_consistent(&self) -> bool {
        let len = self.time.len();
        [
            &self.raw,
            &self.filtered,
            &self.duty_cycle,
            &self.ramp_angle,
            &self.commanded_angle,
        ]
        .iter()
        .all(|series| series.len() == len)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str(contents)
    }
}
