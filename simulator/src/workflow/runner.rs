use crate::generator::profile::{build_signal, TimeAxis};
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use clutchcore::curve::DutyCurve;
use clutchcore::math::SpectrumHelper;
use clutchcore::prelude::{ProcessingStage, StageConfig, StageInput, StageOutput};
use clutchcore::processing::{AngleRampStage, DutyAngleStage, DutyCycleStage, SmoothingStage};
use clutchcore::telemetry::{Metrics, MetricsRecorder};
use clutchcore::trace::{AxisBounds, SimulationTrace, TraceSummary};
use log::info;

pub struct WorkflowResult {
    pub trace: SimulationTrace,
    pub metrics: Metrics,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Generate the configured signal and run it through every stage.
    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let raw = build_signal(&self.config.signal, &self.config.time)
            .context("generating sensor signal")?;
        self.execute_samples(raw)
    }

    /// Run an externally supplied raw signal starting at the configured time.
    pub fn execute_samples(&self, raw: Vec<f64>) -> anyhow::Result<WorkflowResult> {
        TimeAxis::new(self.config.time.start, self.config.time.end)
            .context("validating time axis")?;
        if raw.len() != self.config.time.len() {
            anyhow::bail!(
                "signal has {} samples but time axis {}..={} needs {}",
                raw.len(),
                self.config.time.start,
                self.config.time.end,
                self.config.time.len()
            );
        }
        let stage_config = self.config.to_stage_config();
        let start = self.config.time.start;
        let metrics = MetricsRecorder::new();

        let filtered = run_stage(
            &mut SmoothingStage::new(),
            "smoothing",
            &stage_config,
            StageInput::new(raw.clone(), start),
            &metrics,
        )?;
        let duty = run_stage(
            &mut DutyCycleStage::new(),
            "duty-cycle",
            &stage_config,
            StageInput::new(filtered.samples.clone(), start),
            &metrics,
        )?;
        let ramp = run_stage(
            &mut AngleRampStage::new(),
            "angle-ramp",
            &stage_config,
            StageInput::new(raw.clone(), start),
            &metrics,
        )?;
        let commanded = run_stage(
            &mut DutyAngleStage::new(),
            "duty-angle",
            &stage_config,
            StageInput::new(duty.samples.clone(), start),
            &metrics,
        )?;

        let curve = DutyCurve::new(&stage_config.curve).context("building duty curve")?;
        let (duty_lo, duty_hi) = curve.duty_range();

        let mut summary = spectrum_summary(&raw, &filtered.samples, stage_config.filter_factor);
        summary.clamped_duty = duty.metadata.clamped_count.unwrap_or(0);
        summary.saturated_ramp = ramp.metadata.clamped_count.unwrap_or(0);
        summary.notes = [&filtered, &duty, &ramp, &commanded]
            .into_iter()
            .flat_map(|output| output.metadata.notes.iter().cloned())
            .collect();

        let trace = SimulationTrace {
            scenario: self.config.name.clone(),
            time: self.config.time.indices().collect(),
            position_bounds: AxisBounds::around(&raw),
            duty_bounds: AxisBounds::new(duty_lo, duty_hi),
            angle_bounds: AxisBounds::new(stage_config.servo.min, stage_config.servo.max),
            curve_shape: curve.normalized_shape(),
            raw,
            filtered: filtered.samples,
            duty_cycle: duty.samples,
            ramp_angle: ramp.samples,
            commanded_angle: commanded.samples,
            summary,
        };

        let metrics = metrics.snapshot();
        info!(
            "scenario {} finished: {} stages, {} samples, {} clamped",
            trace.scenario, metrics.stages, metrics.samples, metrics.clamped
        );

        Ok(WorkflowResult { trace, metrics })
    }
}

fn run_stage(
    stage: &mut dyn ProcessingStage,
    name: &str,
    config: &StageConfig,
    input: StageInput,
    metrics: &MetricsRecorder,
) -> anyhow::Result<StageOutput> {
    let samples = input.samples.len();
    let result = stage
        .initialize(config)
        .with_context(|| format!("initializing {name} stage"))
        .and_then(|_| {
            stage
                .execute(input)
                .with_context(|| format!("executing {name} stage"))
        });
    stage.cleanup();

    match result {
        Ok(output) => {
            metrics.record_stage(samples, output.metadata.clamped_count.unwrap_or(0));
            Ok(output)
        }
        Err(err) => {
            metrics.record_error();
            Err(err)
        }
    }
}

/// Filter gain at the strongest raw-signal component, measured and analytic.
fn spectrum_summary(raw: &[f64], filtered: &[f64], alpha: f64) -> TraceSummary {
    let helper = SpectrumHelper::new(raw.len());
    let raw_mags = helper.magnitudes(raw);
    let filtered_mags = helper.magnitudes(filtered);

    let mut summary = TraceSummary {
        filter_factor: alpha,
        ..Default::default()
    };
    if let Some(bin) = SpectrumHelper::dominant_bin(&raw_mags) {
        summary.dominant_period = Some(helper.size() as f64 / bin as f64);
        summary.measured_gain = Some(filtered_mags[bin] / raw_mags[bin]);
        summary.analytic_gain = Some(SpectrumHelper::smoothing_gain(
            alpha,
            helper.bin_frequency(bin),
        ));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::presets;
    use clutchcore::math::StatsHelper;

    #[test]
    fn runner_executes_sine_sweep() {
        let cfg = presets::sine_sweep();
        let result = Runner::new(cfg.clone()).execute().unwrap();
        let trace = &result.trace;

        assert_eq!(trace.len(), cfg.time.len());
        assert!(trace.is_consistent());
        assert_eq!(trace.filtered[0], trace.raw[0]);
        assert!(trace
            .duty_cycle
            .iter()
            .all(|&d| (0.3 - 1e-12..=0.675 + 1e-12).contains(&d)));
        assert!(StatsHelper::is_non_decreasing(&trace.ramp_angle));
        assert!(trace.ramp_angle.iter().all(|&a| a <= 100.0));
        assert_eq!(trace.curve_shape.len(), 3);
        assert_eq!(result.metrics.stages, 4);
        assert_eq!(result.metrics.errors, 0);
    }

    #[test]
    fn runner_reports_filter_attenuation() {
        let result = Runner::new(presets::sine_sweep()).execute().unwrap();
        let summary = &result.trace.summary;
        let measured = summary.measured_gain.unwrap();
        let analytic = summary.analytic_gain.unwrap();
        assert!(measured < 1.0 && analytic < 1.0);
        assert!((measured - analytic).abs() < 0.02);
        assert!(summary.dominant_period.unwrap() > 100.0);
    }

    #[test]
    fn constant_signal_converges_to_its_level() {
        let mut cfg = presets::wide_band();
        cfg.signal.disturbance = None;
        let mut raw = vec![490.0; cfg.time.len()];
        raw[0] = 400.0;
        let result = Runner::new(cfg).execute_samples(raw).unwrap();
        let last = *result.trace.filtered.last().unwrap();
        assert!((last - 490.0).abs() < 1e-6);
        assert!(StatsHelper::is_non_decreasing(&result.trace.filtered));
        assert_eq!(*result.trace.duty_cycle.last().unwrap(), 0.65);
        assert_eq!(result.trace.position_bounds.max, 490.0);
    }

    #[test]
    fn invalid_filter_factor_surfaces_stage_context() {
        let cfg = presets::sine_sweep().with_filter_factor(Some(0.0));
        let err = Runner::new(cfg).execute().err().unwrap();
        assert!(format!("{err:#}").contains("initializing smoothing stage"));
    }

    #[test]
    fn mismatched_signal_length_is_rejected() {
        let runner = Runner::new(presets::sine_sweep());
        assert!(runner.execute_samples(vec![400.0; 3]).is_err());
    }

    #[test]
    fn unrepresentable_time_axis_fails_with_context() {
        let mut cfg = presets::sine_sweep();
        cfg.time.start = i64::MIN;
        cfg.time.end = i64::MAX;
        let runner = Runner::new(cfg);

        let err = runner.execute().err().unwrap();
        assert!(format!("{err:#}").contains("validating time axis"));
        let err = runner.execute_samples(Vec::new()).err().unwrap();
        assert!(format!("{err:#}").contains("validating time axis"));
    }
}
