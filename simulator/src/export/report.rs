use crate::workflow::runner::WorkflowResult;
use serde::Serialize;

/// One-line run summary appended to the run log.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub scenario: String,
    pub samples: usize,
    pub filter_factor: f64,
    pub clamped_duty: usize,
    pub saturated_ramp: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measured_gain: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytic_gain: Option<f64>,
    pub errors: usize,
}

impl RunReport {
    pub fn from_result(result: &WorkflowResult) -> Self {
        let summary = &result.trace.summary;
        Self {
            scenario: result.trace.scenario.clone(),
            samples: result.trace.len(),
            filter_factor: summary.filter_factor,
            clamped_duty: summary.clamped_duty,
            saturated_ramp: summary.saturated_ramp,
            measured_gain: summary.measured_gain,
            analytic_gain: summary.analytic_gain,
            errors: result.metrics.errors,
        }
    }

    pub fn to_line(&self) -> String {
        let gain = match (self.measured_gain, self.analytic_gain) {
            (Some(measured), Some(analytic)) => {
                format!("gain={measured:.4} (analytic {analytic:.4})")
            }
            _ => "gain=n/a".to_string(),
        };
        format!(
            "scenario={} samples={} alpha={} duty_clamped={} ramp_saturated={} {}\n",
            self.scenario,
            self.samples,
            self.filter_factor,
            self.clamped_duty,
            self.saturated_ramp,
            gain
        )
    }
}
