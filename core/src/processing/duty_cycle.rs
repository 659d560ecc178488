use crate::curve::{Band, DutyCurve};
use crate::prelude::{
    ProcessingStage, StageConfig, StageError, StageInput, StageMetadata, StageOutput, StageResult,
};
use crate::telemetry::log::LogManager;

/// Maps filtered clutch position to actuator duty cycle.
pub struct DutyCycleStage {
    curve: Option<DutyCurve>,
    logger: LogManager,
}

impl DutyCycleStage {
    pub fn new() -> Self {
        Self {
            curve: None,
            logger: LogManager::new("duty-cycle"),
        }
    }

    pub fn curve(&self) -> Option<&DutyCurve> {
        self.curve.as_ref()
    }
}

impl Default for DutyCycleStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for DutyCycleStage {
    fn initialize(&mut self, config: &StageConfig) -> StageResult<()> {
        let curve = DutyCurve::new(&config.curve)?;
        for (idx, segment) in curve.segments().iter().enumerate() {
            self.logger
                .trace_value(&format!("segment {idx} slope"), segment.slope);
        }
        self.curve = Some(curve);
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        input.ensure_finite(self.logger.stage())?;
        let curve = self
            .curve
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;

        let mut floor = 0;
        let mut ceiling = 0;
        let samples = input
            .samples
            .iter()
            .map(|&position| {
                match curve.band(position) {
                    Band::Floor => floor += 1,
                    Band::Ceiling => ceiling += 1,
                    Band::Segment(_) => {}
                }
                curve.evaluate(position)
            })
            .collect::<Vec<_>>();

        self.logger.record(&format!(
            "{} samples, {} at floor, {} at ceiling",
            samples.len(),
            floor,
            ceiling
        ));

        Ok(StageOutput {
            samples,
            metadata: StageMetadata {
                clamped_count: Some(floor + ceiling),
                notes: vec![format!("duty clamped floor {floor} ceiling {ceiling}")],
            },
        })
    }

    fn cleanup(&mut self) {
        self.curve = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{Breakpoint, CurveConfig};
    use crate::prelude::ServoLimits;

    fn config() -> StageConfig {
        StageConfig {
            filter_factor: 0.1,
            curve: CurveConfig {
                breakpoints: vec![
                    Breakpoint::new(360.0, 3000.0),
                    Breakpoint::new(410.0, 7000.0),
                    Breakpoint::new(460.0, 9000.0),
                    Breakpoint::new(485.0, 13000.0),
                ],
                duty_max: Some(20000.0),
            },
            servo: ServoLimits::default(),
        }
    }

    #[test]
    fn duty_stage_maps_and_counts_clamps() {
        let mut stage = DutyCycleStage::new();
        stage.initialize(&config()).unwrap();

        let output = stage
            .execute(StageInput::new(vec![300.0, 410.0, 435.0, 500.0], 0))
            .unwrap();
        assert_eq!(output.samples, vec![0.15, 0.35, 0.4, 0.65]);
        assert_eq!(output.metadata.clamped_count, Some(2));
        stage.cleanup();
        assert!(stage.curve().is_none());
    }

    #[test]
    fn duty_stage_rejects_bad_curve() {
        let mut stage = DutyCycleStage::new();
        let mut bad = config();
        bad.curve.breakpoints.truncate(1);
        assert!(stage.initialize(&bad).is_err());
    }
}
