use crate::math::stats::StatsHelper;
use serde::{Deserialize, Serialize};

/// Fixed plotting range for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

impl AxisBounds {
    pub const UNIT: AxisBounds = AxisBounds { min: 0.0, max: 1.0 };

    pub fn new(min: f64, max: f64) -> Self {
        if max > min {
            Self { min, max }
        } else {
            // degenerate range gets one unit either side
            let center = if min.is_finite() { min } else { 0.0 };
            Self {
                min: center - 1.0,
                max: center + 1.0,
            }
        }
    }

    /// Tightest bounds around the series, widened when it is flat or empty.
    pub fn around(samples: &[f64]) -> Self {
        match StatsHelper::extrema(samples) {
            Some((lo, hi)) => Self::new(lo, hi),
            None => Self::UNIT,
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `value` within the bounds, 0 at `min` and 1 at `max`.
    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.min) / self.span()
    }
}
