use crate::curve::CurveConfig;
use serde::{Deserialize, Serialize};

/// Servo travel limits and ramp rate shared by the angle stages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoLimits {
    pub min: f64,
    pub max: f64,
    /// Maximum angle increment per time step.
    pub speed: f64,
    /// Time index before which the ramp holds at `min`.
    pub hold_until: i64,
}

impl Default for ServoLimits {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            speed: 0.6,
            hold_until: 1,
        }
    }
}

impl ServoLimits {
    pub fn validate(&self) -> StageResult<()> {
        if !(self.min.is_finite() && self.max.is_finite() && self.speed.is_finite()) {
            return Err(StageError::InvalidConfig(
                "servo limits must be finite".into(),
            ));
        }
        if self.max < self.min {
            return Err(StageError::InvalidConfig(format!(
                "servo max {} below servo min {}",
                self.max, self.min
            )));
        }
        if self.speed < 0.0 {
            return Err(StageError::InvalidConfig(format!(
                "servo speed {} must not be negative",
                self.speed
            )));
        }
        Ok(())
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Shared configuration for each processing stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    pub filter_factor: f64,
    pub curve: CurveConfig,
    pub servo: ServoLimits,
}

/// Input payload for a processing stage.
#[derive(Debug, Clone)]
pub struct StageInput {
    pub samples: Vec<f64>,
    /// Time index of the first sample; indices advance by one per sample.
    pub start: i64,
}

impl StageInput {
    pub fn new(samples: Vec<f64>, start: i64) -> Self {
        Self { samples, start }
    }

    pub(crate) fn ensure_finite(&self, stage: &str) -> StageResult<()> {
        if self.samples.is_empty() {
            return Err(StageError::InvalidInput(format!(
                "{stage} received no samples"
            )));
        }
        if let Some(idx) = self.samples.iter().position(|v| !v.is_finite()) {
            return Err(StageError::InvalidInput(format!(
                "{stage} sample {idx} is not finite"
            )));
        }
        Ok(())
    }
}

/// Output produced by each stage.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub samples: Vec<f64>,
    pub metadata: StageMetadata,
}

/// Metadata used for chaining stages and telemetry.
#[derive(Debug, Clone, Default)]
pub struct StageMetadata {
    /// Samples that hit a clamp (curve end or servo limit).
    pub clamped_count: Option<usize>,
    pub notes: Vec<String>,
}

/// Common error type for stage execution.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("numerical error: {0}")]
    Numerical(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type StageResult<T> = Result<T, StageError>;

/// Trait describing the sequential stages of the simulation pipeline.
pub trait ProcessingStage {
    fn initialize(&mut self, config: &StageConfig) -> StageResult<()>;
    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput>;
    fn cleanup(&mut self);
}
