use crate::prelude::{StageError, StageResult};
use log::warn;
use serde::{Deserialize, Serialize};

/// A position at which the duty-cycle curve changes slope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub position: f64,
    pub duty: f64,
}

impl Breakpoint {
    pub const fn new(position: f64, duty: f64) -> Self {
        Self { position, duty }
    }
}

/// Breakpoint table plus the optional normalization constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveConfig {
    /// Listed from the loose end of the clutch to the tight end.
    pub breakpoints: Vec<Breakpoint>,
    /// Divides every output when set.
    #[serde(default)]
    pub duty_max: Option<f64>,
}

/// Affine map for one band: `duty = (pos - start) * slope + base`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub base: f64,
    pub slope: f64,
}

impl Segment {
    fn eval(&self, position: f64) -> f64 {
        (position - self.start) * self.slope + self.base
    }
}

/// Where an evaluated position landed on the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    /// At or below the lowest breakpoint.
    Floor,
    /// Inside the segment with this index (ascending position order).
    Segment(usize),
    /// Above the highest breakpoint.
    Ceiling,
}

/// Validated piecewise-linear duty-cycle curve.
///
/// Bands are searched from the highest breakpoint down with strict `>`,
/// so a position exactly on a breakpoint is evaluated by the band below it.
/// Both bands agree there, so the result is the breakpoint's own duty.
#[derive(Debug, Clone)]
pub struct DutyCurve {
    listed: Vec<Breakpoint>,
    ascending: Vec<Breakpoint>,
    segments: Vec<Segment>,
    scale: f64,
}

impl DutyCurve {
    pub fn new(config: &CurveConfig) -> StageResult<Self> {
        let listed = config.breakpoints.clone();
        if listed.len() < 2 {
            return Err(StageError::InvalidConfig(format!(
                "duty curve needs at least 2 breakpoints, got {}",
                listed.len()
            )));
        }
        if listed
            .iter()
            .any(|bp| !bp.position.is_finite() || !bp.duty.is_finite())
        {
            return Err(StageError::InvalidConfig(
                "breakpoints must be finite".into(),
            ));
        }

        let scale = match config.duty_max {
            Some(max) if max > 0.0 && max.is_finite() => max,
            Some(max) => {
                return Err(StageError::InvalidConfig(format!(
                    "duty_max {max} must be positive"
                )))
            }
            None => 1.0,
        };

        let rising = listed[1].position > listed[0].position;
        for pair in listed.windows(2) {
            let step = pair[1].position - pair[0].position;
            if step == 0.0 {
                return Err(StageError::InvalidConfig(format!(
                    "breakpoints share position {}",
                    pair[0].position
                )));
            }
            if (step > 0.0) != rising {
                return Err(StageError::InvalidConfig(format!(
                    "breakpoint positions are not monotonic at {}",
                    pair[1].position
                )));
            }
        }

        let duty_rising = listed[listed.len() - 1].duty >= listed[0].duty;
        let duty_monotonic = listed.windows(2).all(|pair| {
            if duty_rising {
                pair[1].duty >= pair[0].duty
            } else {
                pair[1].duty <= pair[0].duty
            }
        });
        if !duty_monotonic {
            warn!("duty curve values are not monotonic: {:?}", listed);
        }

        let mut ascending = listed.clone();
        if !rising {
            ascending.reverse();
        }

        let segments = ascending
            .windows(2)
            .map(|pair| Segment {
                start: pair[0].position,
                base: pair[0].duty,
                slope: (pair[1].duty - pair[0].duty) / (pair[1].position - pair[0].position),
            })
            .collect();

        Ok(Self {
            listed,
            ascending,
            segments,
            scale,
        })
    }

    /// Locate the band a position falls in.
    pub fn band(&self, position: f64) -> Band {
        let top = self.ascending.len() - 1;
        if position > self.ascending[top].position {
            return Band::Ceiling;
        }
        self.segments
            .iter()
            .rposition(|segment| position > segment.start)
            .map(Band::Segment)
            .unwrap_or(Band::Floor)
    }

    /// Raw duty cycle before normalization.
    pub fn raw_duty(&self, position: f64) -> f64 {
        match self.band(position) {
            Band::Ceiling => self.ascending[self.ascending.len() - 1].duty,
            Band::Segment(idx) => self.segments[idx].eval(position),
            Band::Floor => self.ascending[0].duty,
        }
    }

    /// Duty cycle in output scale (divided by `duty_max` when configured).
    pub fn evaluate(&self, position: f64) -> f64 {
        self.raw_duty(position) / self.scale
    }

    /// Smaller and larger clamp values in output scale.
    pub fn duty_range(&self) -> (f64, f64) {
        let first = self.ascending[0].duty / self.scale;
        let last = self.ascending[self.ascending.len() - 1].duty / self.scale;
        (first.min(last), first.max(last))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.listed
    }

    /// Breakpoints as fractions of the total travel, in listed order.
    ///
    /// Each point is `(|p_i - p_0| / |p_n - p_0|, |d_i - d_0| / |d_n - d_0|)`.
    /// A flat curve reports zero on the duty axis.
    pub fn normalized_shape(&self) -> Vec<[f64; 2]> {
        let first = self.listed[0];
        let last = self.listed[self.listed.len() - 1];
        let travel = (last.position - first.position).abs();
        let duty_travel = (last.duty - first.duty).abs();
        self.listed
            .iter()
            .map(|bp| {
                let x = (bp.position - first.position).abs() / travel;
                let y = if duty_travel > 0.0 {
                    (bp.duty - first.duty).abs() / duty_travel
                } else {
                    0.0
                };
                [x, y]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide_band() -> DutyCurve {
        DutyCurve::new(&CurveConfig {
            breakpoints: vec![
                Breakpoint::new(360.0, 3000.0),
                Breakpoint::new(410.0, 7000.0),
                Breakpoint::new(460.0, 9000.0),
                Breakpoint::new(485.0, 13000.0),
            ],
            duty_max: None,
        })
        .unwrap()
    }

    fn sine_sweep() -> DutyCurve {
        DutyCurve::new(&CurveConfig {
            breakpoints: vec![
                Breakpoint::new(427.0, 6000.0),
                Breakpoint::new(387.0, 9500.0),
                Breakpoint::new(378.0, 13500.0),
            ],
            duty_max: Some(20000.0),
        })
        .unwrap()
    }

    #[test]
    fn breakpoint_tie_uses_lower_band() {
        let curve = wide_band();
        assert_eq!(curve.band(410.0), Band::Segment(0));
        assert_eq!(curve.raw_duty(410.0), 7000.0);
    }

    #[test]
    fn clamps_outside_outer_breakpoints() {
        let curve = wide_band();
        assert_eq!(curve.band(360.0), Band::Floor);
        assert_eq!(curve.raw_duty(100.0), 3000.0);
        assert_eq!(curve.band(485.5), Band::Ceiling);
        assert_eq!(curve.raw_duty(900.0), 13000.0);
    }

    #[test]
    fn curve_is_continuous_at_breakpoints() {
        for curve in [wide_band(), sine_sweep()] {
            for bp in curve.breakpoints() {
                let eps = 1e-9;
                let below = curve.raw_duty(bp.position - eps);
                let above = curve.raw_duty(bp.position + eps);
                assert!((below - bp.duty).abs() < 1e-3, "below {}", bp.position);
                assert!((above - bp.duty).abs() < 1e-3, "above {}", bp.position);
            }
        }
    }

    #[test]
    fn descending_table_matches_hand_computed_band() {
        let curve = sine_sweep();
        // (400 - 387) * (6000 - 9500) / (427 - 387) + 9500
        assert!((curve.raw_duty(400.0) - 8362.5).abs() < 1e-9);
        assert!((curve.evaluate(430.0) - 0.3).abs() < 1e-12);
        assert!((curve.evaluate(370.0) - 0.675).abs() < 1e-12);
        assert_eq!(curve.duty_range(), (0.3, 0.675));
    }

    #[test]
    fn rejects_coincident_positions() {
        let result = DutyCurve::new(&CurveConfig {
            breakpoints: vec![Breakpoint::new(400.0, 1.0), Breakpoint::new(400.0, 2.0)],
            duty_max: None,
        });
        assert!(matches!(result, Err(StageError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_non_monotonic_positions_and_bad_scale() {
        let zigzag = CurveConfig {
            breakpoints: vec![
                Breakpoint::new(400.0, 1.0),
                Breakpoint::new(420.0, 2.0),
                Breakpoint::new(410.0, 3.0),
            ],
            duty_max: None,
        };
        assert!(DutyCurve::new(&zigzag).is_err());

        let zero_scale = CurveConfig {
            breakpoints: vec![Breakpoint::new(1.0, 1.0), Breakpoint::new(2.0, 2.0)],
            duty_max: Some(0.0),
        };
        assert!(DutyCurve::new(&zero_scale).is_err());
    }

    #[test]
    fn non_monotonic_duty_is_accepted() {
        let curve = DutyCurve::new(&CurveConfig {
            breakpoints: vec![
                Breakpoint::new(360.0, 3000.0),
                Breakpoint::new(410.0, 9000.0),
                Breakpoint::new(460.0, 7000.0),
            ],
            duty_max: None,
        })
        .unwrap();
        assert_eq!(curve.raw_duty(435.0), 8000.0);
        assert_eq!(curve.raw_duty(500.0), 7000.0);
    }

    #[test]
    fn normalized_shape_follows_listed_order() {
        let shape = sine_sweep().normalized_shape();
        assert_eq!(shape.len(), 3);
        assert_eq!(shape[0], [0.0, 0.0]);
        assert!((shape[1][0] - 40.0 / 49.0).abs() < 1e-12);
        assert!((shape[1][1] - 3500.0 / 7500.0).abs() < 1e-12);
        assert_eq!(shape[2], [1.0, 1.0]);
    }
}
