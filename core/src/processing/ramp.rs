use crate::prelude::{
    ProcessingStage, ServoLimits, StageConfig, StageError, StageInput, StageMetadata, StageOutput,
    StageResult,
};
use crate::telemetry::log::LogManager;

/// Saturating servo ramp: rises by `speed` per step until `max`.
#[derive(Debug, Clone, Copy)]
pub struct AngleRamp {
    limits: ServoLimits,
    angle: Option<f64>,
}

impl AngleRamp {
    pub fn new(limits: ServoLimits) -> StageResult<Self> {
        limits.validate()?;
        Ok(Self {
            limits,
            angle: None,
        })
    }

    /// Advance to time index `t`. The first call always yields `min`.
    pub fn step(&mut self, t: i64) -> f64 {
        let next = match self.angle {
            Some(_) if t < self.limits.hold_until => self.limits.min,
            Some(prev) => (prev + self.limits.speed).min(self.limits.max),
            None => self.limits.min,
        };
        self.angle = Some(next);
        next
    }

    pub fn reset(&mut self) {
        self.angle = None;
    }
}

/// Reference ramp plotted against the duty-derived angle.
///
/// Only the time axis of the input is used; the ramp is open loop.
pub struct AngleRampStage {
    ramp: Option<AngleRamp>,
    logger: LogManager,
}

impl AngleRampStage {
    pub fn new() -> Self {
        Self {
            ramp: None,
            logger: LogManager::new("angle-ramp"),
        }
    }
}

impl Default for AngleRampStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for AngleRampStage {
    fn initialize(&mut self, config: &StageConfig) -> StageResult<()> {
        self.ramp = Some(AngleRamp::new(config.servo)?);
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        if input.samples.is_empty() {
            return Err(StageError::InvalidInput("angle-ramp received no samples".into()));
        }
        let ramp = self
            .ramp
            .as_mut()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;
        ramp.reset();

        let max = ramp.limits.max;
        let samples = (0..input.samples.len())
            .map(|offset| ramp.step(input.start + offset as i64))
            .collect::<Vec<_>>();
        let saturated = samples.iter().filter(|&&angle| angle >= max).count();

        self.logger
            .record(&format!("{} steps, {} saturated", samples.len(), saturated));

        Ok(StageOutput {
            samples,
            metadata: StageMetadata {
                clamped_count: Some(saturated),
                notes: vec![format!("ramp saturated for {saturated} steps")],
            },
        })
    }

    fn cleanup(&mut self) {
        self.ramp = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{Breakpoint, CurveConfig};
    use crate::math::stats::StatsHelper;

    fn config(servo: ServoLimits) -> StageConfig {
        StageConfig {
            filter_factor: 0.1,
            curve: CurveConfig {
                breakpoints: vec![Breakpoint::new(0.0, 0.0), Breakpoint::new(1.0, 1.0)],
                duty_max: None,
            },
            servo,
        }
    }

    #[test]
    fn ramp_is_bounded_and_non_decreasing() {
        let mut stage = AngleRampStage::new();
        stage.initialize(&config(ServoLimits::default())).unwrap();
        let output = stage.execute(StageInput::new(vec![0.0; 501], 0)).unwrap();

        assert_eq!(output.samples[0], 0.0);
        assert!((output.samples[1] - 0.6).abs() < 1e-12);
        assert!(output.samples.iter().all(|&a| a <= 100.0));
        assert!(StatsHelper::is_non_decreasing(&output.samples));
        assert_eq!(output.samples[500], 100.0);
        assert!(output.metadata.clamped_count.unwrap() > 300);
    }

    #[test]
    fn ramp_holds_until_break() {
        let limits = ServoLimits {
            min: 10.0,
            max: 12.0,
            speed: 1.0,
            hold_until: 3,
        };
        let mut ramp = AngleRamp::new(limits).unwrap();
        let angles: Vec<f64> = (0..7).map(|t| ramp.step(t)).collect();
        assert_eq!(angles, vec![10.0, 10.0, 10.0, 11.0, 12.0, 12.0, 12.0]);
    }

    #[test]
    fn ramp_starts_at_min_even_after_break() {
        let mut ramp = AngleRamp::new(ServoLimits::default()).unwrap();
        assert_eq!(ramp.step(40), 0.0);
        assert!((ramp.step(41) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn rejects_negative_speed() {
        let limits = ServoLimits {
            speed: -1.0,
            ..Default::default()
        };
        assert!(AngleRamp::new(limits).is_err());
    }
}
