use crate::generator::profile::{SignalConfig, TimeAxis};
use crate::workflow::presets;
use anyhow::{bail, Context};
use clutchcore::curve::CurveConfig;
use clutchcore::prelude::{ServoLimits, StageConfig};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

/// Scenario names become `<name>.json`, so they must be one plain path component.
pub fn check_scenario_name(name: &str) -> anyhow::Result<()> {
    if Path::new(name).file_name() != Some(OsStr::new(name)) {
        bail!("scenario name {name:?} must be a single non-empty file name");
    }
    Ok(())
}

/// One simulation scenario: signal, filter, duty curve and servo limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub name: String,
    pub time: TimeAxis,
    pub signal: SignalConfig,
    pub filter_factor: f64,
    pub curve: CurveConfig,
    pub servo: ServoLimits,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        presets::sine_sweep()
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        check_scenario_name(&config.name)
            .with_context(|| format!("validating workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_preset(name: &str) -> anyhow::Result<Self> {
        presets::lookup(name).with_context(|| {
            format!(
                "unknown preset {name}, expected one of {}",
                presets::NAMES.join(", ")
            )
        })
    }

    pub fn with_filter_factor(mut self, filter_factor: Option<f64>) -> Self {
        if let Some(alpha) = filter_factor {
            self.filter_factor = alpha;
        }
        self
    }

    pub fn to_stage_config(&self) -> StageConfig {
        StageConfig {
            filter_factor: self.filter_factor,
            curve: self.curve.clone(),
            servo: self.servo,
        }
    }
}
