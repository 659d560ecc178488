use crate::math::stats::StatsHelper;
use crate::prelude::{
    ProcessingStage, StageConfig, StageError, StageInput, StageMetadata, StageOutput, StageResult,
};
use crate::telemetry::log::LogManager;

/// First-order IIR low-pass: `y = a*x + (1-a)*y_prev`.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialFilter {
    alpha: f64,
    filtered: Option<f64>,
}

impl ExponentialFilter {
    pub fn new(alpha: f64) -> StageResult<Self> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(StageError::InvalidConfig(format!(
                "filter factor {alpha} outside (0, 1]"
            )));
        }
        Ok(Self {
            alpha,
            filtered: None,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Advance by one sample. The first sample seeds the state unchanged.
    pub fn apply(&mut self, raw: f64) -> f64 {
        let next = match self.filtered {
            Some(prev) => self.alpha * raw + (1.0 - self.alpha) * prev,
            None => raw,
        };
        self.filtered = Some(next);
        next
    }

    pub fn reset(&mut self) {
        self.filtered = None;
    }
}

/// Smoothing stage producing the lagged position seen by the duty mapper.
pub struct SmoothingStage {
    filter: Option<ExponentialFilter>,
    logger: LogManager,
}

impl SmoothingStage {
    pub fn new() -> Self {
        Self {
            filter: None,
            logger: LogManager::new("smoothing"),
        }
    }
}

impl Default for SmoothingStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for SmoothingStage {
    fn initialize(&mut self, config: &StageConfig) -> StageResult<()> {
        self.filter = Some(ExponentialFilter::new(config.filter_factor)?);
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        input.ensure_finite(self.logger.stage())?;
        let filter = self
            .filter
            .as_mut()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;
        filter.reset();

        let samples: Vec<f64> = input.samples.iter().map(|&raw| filter.apply(raw)).collect();
        if samples.iter().any(|v| !v.is_finite()) {
            return Err(StageError::Numerical("filter output overflowed".into()));
        }

        let lag = StatsHelper::rms(
            &input
                .samples
                .iter()
                .zip(&samples)
                .map(|(raw, smooth)| raw - smooth)
                .collect::<Vec<_>>(),
        );
        self.logger
            .record(&format!("alpha {:.3} lag RMS {:.4}", filter.alpha(), lag));

        Ok(StageOutput {
            samples,
            metadata: StageMetadata {
                notes: vec![format!("smoothing lag RMS {:.4}", lag)],
                ..Default::default()
            },
        })
    }

    fn cleanup(&mut self) {
        self.filter = None;
    }
}
