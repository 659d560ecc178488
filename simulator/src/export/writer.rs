use crate::export::report::RunReport;
use crate::workflow::config::check_scenario_name;
use anyhow::Context;
use clutchcore::trace::SimulationTrace;
use log::info;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const RUN_LOG: &str = "simulation_runs.log";

/// Writes traces for the visualizer and appends run summaries.
pub struct TraceExporter {
    output_dir: PathBuf,
}

impl TraceExporter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn trace_path(&self, scenario: &str) -> anyhow::Result<PathBuf> {
        check_scenario_name(scenario).context("choosing trace file name")?;
        Ok(self.output_dir.join(format!("{scenario}.json")))
    }

    pub fn write_trace(&self, trace: &SimulationTrace) -> anyhow::Result<PathBuf> {
        let path = self.trace_path(&trace.scenario)?;
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("creating output dir {}", self.output_dir.display()))?;
        let json = trace.to_json().context("serializing simulation trace")?;
        fs::write(&path, json).with_context(|| format!("writing trace {}", path.display()))?;
        info!("trace written to {}", path.display());
        Ok(path)
    }

    pub fn append_report(&self, report: &RunReport) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("creating output dir {}", self.output_dir.display()))?;
        let path = self.output_dir.join(RUN_LOG);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening run log {}", path.display()))?;
        file.write_all(report.to_line().as_bytes())
            .with_context(|| format!("appending run log {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::presets;
    use crate::workflow::runner::Runner;

    #[test]
    fn exporter_writes_trace_and_appends_log() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = TraceExporter::new(dir.path().join("data"));
        let result = Runner::new(presets::step_engage()).execute().unwrap();

        let path = exporter.write_trace(&result.trace).unwrap();
        assert!(path.ends_with("step-engage.json"));
        let parsed = SimulationTrace::from_json(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.scenario, "step-engage");
        assert_eq!(parsed.len(), result.trace.len());
        assert!(parsed.is_consistent());

        let report = RunReport::from_result(&result);
        let log = exporter.append_report(&report).unwrap();
        exporter.append_report(&report).unwrap();
        let contents = fs::read_to_string(log).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.starts_with("scenario=step-engage samples=501"));
    }

    #[test]
    fn exporter_refuses_names_outside_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("data");
        let exporter = TraceExporter::new(&output);
        let mut cfg = presets::sine_sweep();
        cfg.name = "../escaped".into();
        let result = Runner::new(cfg).execute().unwrap();

        assert!(exporter.write_trace(&result.trace).is_err());
        assert!(!dir.path().join("escaped.json").exists());
        assert!(!output.exists());
        assert!(exporter.trace_path("").is_err());
        assert_eq!(
            exporter.trace_path("sine-sweep").unwrap(),
            output.join("sine-sweep.json")
        );
    }
}
