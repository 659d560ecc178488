use crate::curve::DutyCurve;
use crate::prelude::{
    ProcessingStage, ServoLimits, StageConfig, StageError, StageInput, StageMetadata, StageOutput,
    StageResult,
};
use crate::telemetry::log::LogManager;

/// Linear map from the curve's duty range onto the servo travel.
#[derive(Debug, Clone, Copy)]
pub struct DutyAngleMap {
    duty_lo: f64,
    duty_span: f64,
    limits: ServoLimits,
}

impl DutyAngleMap {
    pub fn new(curve: &DutyCurve, limits: ServoLimits) -> StageResult<Self> {
        limits.validate()?;
        let (duty_lo, duty_hi) = curve.duty_range();
        let duty_span = duty_hi - duty_lo;
        if duty_span <= 0.0 {
            return Err(StageError::InvalidConfig(
                "duty curve is flat, cannot derive a servo angle".into(),
            ));
        }
        Ok(Self {
            duty_lo,
            duty_span,
            limits,
        })
    }

    pub fn angle(&self, duty: f64) -> f64 {
        (duty - self.duty_lo) / self.duty_span * self.limits.span() + self.limits.min
    }
}

/// Commanded servo angle implied by the duty cycle.
pub struct DutyAngleStage {
    map: Option<DutyAngleMap>,
    logger: LogManager,
}

impl DutyAngleStage {
    pub fn new() -> Self {
        Self {
            map: None,
            logger: LogManager::new("duty-angle"),
        }
    }
}

impl Default for DutyAngleStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for DutyAngleStage {
    fn initialize(&mut self, config: &StageConfig) -> StageResult<()> {
        let curve = DutyCurve::new(&config.curve)?;
        self.map = Some(DutyAngleMap::new(&curve, config.servo)?);
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        input.ensure_finite(self.logger.stage())?;
        let map = self
            .map
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;

        let samples: Vec<f64> = input.samples.iter().map(|&duty| map.angle(duty)).collect();
        let outside = samples
            .iter()
            .filter(|&&a| a < map.limits.min || a > map.limits.max)
            .count();
        if outside > 0 {
            self.logger
                .caution(&format!("{outside} commanded angles outside servo travel"));
        }

        Ok(StageOutput {
            samples,
            metadata: StageMetadata {
                notes: vec![format!("commanded angle outside travel {outside}")],
                ..Default::default()
            },
        })
    }

    fn cleanup(&mut self) {
        self.map = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{Breakpoint, CurveConfig};

    fn config() -> StageConfig {
        StageConfig {
            filter_factor: 0.1,
            curve: CurveConfig {
                breakpoints: vec![
                    Breakpoint::new(427.0, 6000.0),
                    Breakpoint::new(387.0, 9500.0),
                    Breakpoint::new(378.0, 13500.0),
                ],
                duty_max: Some(20000.0),
            },
            servo: ServoLimits::default(),
        }
    }

    #[test]
    fn duty_range_maps_onto_servo_travel() {
        let mut stage = DutyAngleStage::new();
        stage.initialize(&config()).unwrap();
        let output = stage
            .execute(StageInput::new(vec![0.3, 0.675, 0.4875], 0))
            .unwrap();
        assert!(output.samples[0].abs() < 1e-9);
        assert!((output.samples[1] - 100.0).abs() < 1e-9);
        assert!((output.samples[2] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn flat_curve_is_rejected() {
        let mut flat = config();
        flat.curve.breakpoints = vec![Breakpoint::new(1.0, 5.0), Breakpoint::new(2.0, 5.0)];
        let mut stage = DutyAngleStage::new();
        assert!(matches!(
            stage.initialize(&flat),
            Err(StageError::InvalidConfig(_))
        ));
    }
}
