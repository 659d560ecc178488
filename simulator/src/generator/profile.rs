use crate::generator::template::{sinusoid, step};
use anyhow::{bail, Context};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Closed, evenly spaced range of integer time indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeAxis {
    pub start: i64,
    pub end: i64,
}

impl Default for TimeAxis {
    fn default() -> Self {
        Self { start: 0, end: 500 }
    }
}

/// Upper bound on the samples one run may generate.
pub const MAX_SAMPLES: usize = 10_000_000;

fn span(start: i64, end: i64) -> Option<usize> {
    let count = end.checked_sub(start)?.checked_add(1)?;
    usize::try_from(count).ok()
}

impl TimeAxis {
    pub fn new(start: i64, end: i64) -> anyhow::Result<Self> {
        if end < start {
            bail!("time axis end {end} precedes start {start}");
        }
        match span(start, end) {
            Some(count) if count <= MAX_SAMPLES => Ok(Self { start, end }),
            _ => bail!("time axis {start}..={end} exceeds {MAX_SAMPLES} samples"),
        }
    }

    /// Sample count, 0 for an axis `new` would reject as inverted or unrepresentable.
    pub fn len(&self) -> usize {
        span(self.start, self.end).unwrap_or(0)
    }

    pub fn indices(&self) -> impl Iterator<Item = i64> {
        self.start..=self.end
    }
}

/// Shape of the simulated position-sensor reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignalShape {
    Sinusoid { low: f64, high: f64, phase_rate: f64 },
    Step { before: f64, after: f64, at: i64 },
    Constant { value: f64 },
}

impl SignalShape {
    fn sample(&self, t: i64) -> f64 {
        match *self {
            SignalShape::Sinusoid {
                low,
                high,
                phase_rate,
            } => sinusoid(t, low, high, phase_rate),
            SignalShape::Step { before, after, at } => step(t, before, after, at),
            SignalShape::Constant { value } => value,
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        match *self {
            SignalShape::Sinusoid {
                low,
                high,
                phase_rate,
            } => {
                if ![low, high, phase_rate].iter().all(|v| v.is_finite()) {
                    bail!("sinusoid parameters must be finite");
                }
                if high < low {
                    bail!("sinusoid high {high} below low {low}");
                }
            }
            SignalShape::Step { before, after, .. } => {
                if !(before.is_finite() && after.is_finite()) {
                    bail!("step levels must be finite");
                }
            }
            SignalShape::Constant { value } => {
                if !value.is_finite() {
                    bail!("constant level must be finite");
                }
            }
        }
        Ok(())
    }
}

/// Fixed value forced onto `[from, to)`, e.g. a sensor spike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Disturbance {
    pub from: i64,
    pub to: i64,
    pub value: f64,
}

/// Configuration for generating the synthetic sensor signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub shape: SignalShape,
    /// Uniform jitter amplitude added to every sample.
    pub noise: f64,
    pub seed: u64,
    pub disturbance: Option<Disturbance>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            shape: SignalShape::Sinusoid {
                low: 373.0,
                high: 432.0,
                phase_rate: 1.0 / (10.0 * PI),
            },
            noise: 0.0,
            seed: 0,
            disturbance: None,
        }
    }
}

pub fn build_signal(config: &SignalConfig, axis: &TimeAxis) -> anyhow::Result<Vec<f64>> {
    let axis = TimeAxis::new(axis.start, axis.end).context("validating time axis")?;
    config.shape.validate().context("validating signal shape")?;
    if !(config.noise >= 0.0 && config.noise.is_finite()) {
        bail!("noise amplitude {} must be finite and non-negative", config.noise);
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut samples = Vec::with_capacity(axis.len());

    for t in axis.indices() {
        let mut value = config.shape.sample(t);
        if let Some(disturbance) = config.disturbance {
            if (disturbance.from..disturbance.to).contains(&t) {
                value = disturbance.value;
            }
        }
        if config.noise > 0.0 {
            value += rng.gen_range(-config.noise..config.noise);
        }
        samples.push(value);
    }

    Ok(samples)
}
