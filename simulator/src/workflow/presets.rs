//! The three tuning variants of the clutch bench, expressed as data.

use crate::generator::profile::{Disturbance, SignalConfig, SignalShape, TimeAxis};
use crate::workflow::config::WorkflowConfig;
use clutchcore::curve::{Breakpoint, CurveConfig};
use clutchcore::prelude::ServoLimits;
use std::f64::consts::PI;

pub const NAMES: [&str; 3] = ["sine-sweep", "step-engage", "wide-band"];

const CLUTCH_START: f64 = 432.0;
const CLUTCH_END: f64 = 373.0;
const DUTY_MAX: f64 = 20000.0;

pub fn lookup(name: &str) -> Option<WorkflowConfig> {
    match name {
        "sine-sweep" => Some(sine_sweep()),
        "step-engage" => Some(step_engage()),
        "wide-band" => Some(wide_band()),
        _ => None,
    }
}

fn three_point_curve() -> CurveConfig {
    CurveConfig {
        breakpoints: vec![
            Breakpoint::new(427.0, 6000.0),
            Breakpoint::new(387.0, 9500.0),
            Breakpoint::new(378.0, 13500.0),
        ],
        duty_max: Some(DUTY_MAX),
    }
}

/// Slow sinusoid across the full clutch travel.
pub fn sine_sweep() -> WorkflowConfig {
    WorkflowConfig {
        name: "sine-sweep".into(),
        time: TimeAxis { start: 0, end: 500 },
        signal: SignalConfig {
            shape: SignalShape::Sinusoid {
                low: CLUTCH_END,
                high: CLUTCH_START,
                phase_rate: 1.0 / (10.0 * PI),
            },
            ..SignalConfig::default()
        },
        filter_factor: 0.1,
        curve: three_point_curve(),
        servo: ServoLimits::default(),
    }
}

/// Clutch released in one step from fully engaged.
pub fn step_engage() -> WorkflowConfig {
    WorkflowConfig {
        name: "step-engage".into(),
        signal: SignalConfig {
            shape: SignalShape::Step {
                before: CLUTCH_END,
                after: CLUTCH_START,
                at: 50,
            },
            ..SignalConfig::default()
        },
        servo: ServoLimits {
            hold_until: 50,
            ..ServoLimits::default()
        },
        ..sine_sweep()
    }
}

/// Four-breakpoint curve over a wider travel, with a sensor spike.
pub fn wide_band() -> WorkflowConfig {
    WorkflowConfig {
        name: "wide-band".into(),
        signal: SignalConfig {
            shape: SignalShape::Sinusoid {
                low: 355.0,
                high: 490.0,
                phase_rate: 1.0 / (10.0 * PI),
            },
            disturbance: Some(Disturbance {
                from: 100,
                to: 110,
                value: 490.0,
            }),
            ..SignalConfig::default()
        },
        curve: CurveConfig {
            breakpoints: vec![
                Breakpoint::new(360.0, 3000.0),
                Breakpoint::new(410.0, 7000.0),
                Breakpoint::new(460.0, 9000.0),
                Breakpoint::new(485.0, 13000.0),
            ],
            duty_max: Some(DUTY_MAX),
        },
        ..sine_sweep()
    }
}
