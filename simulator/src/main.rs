use anyhow::Context;
use clap::Parser;
use export::{RunReport, TraceExporter};
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::presets;
use workflow::runner::Runner;

mod export;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Clutch servo simulation driver")]
struct Args {
    /// Named scenario to run
    #[arg(long, default_value = "sine-sweep")]
    preset: String,
    /// Load a workflow config from YAML instead of a preset
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Override the smoothing filter factor
    #[arg(long)]
    filter_factor: Option<f64>,
    /// Directory receiving the trace and the run log
    #[arg(long, default_value = "tools/data")]
    output_dir: PathBuf,
    /// Print the summary only, write nothing
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Print the run summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
    /// List the built-in presets and exit
    #[arg(long, default_value_t = false)]
    list_presets: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list_presets {
        for name in presets::NAMES {
            println!("{name}");
        }
        return Ok(());
    }

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_preset(&args.preset)?
    };
    let workflow_config = workflow_config.with_filter_factor(args.filter_factor);

    let runner = Runner::new(workflow_config);
    let result = runner
        .execute()
        .with_context(|| format!("running scenario {}", runner.config().name))?;
    let report = RunReport::from_result(&result);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing run summary")?
        );
    } else {
        print!("{}", report.to_line());
        for note in &result.trace.summary.notes {
            println!("  {note}");
        }
    }

    if !args.offline {
        let exporter = TraceExporter::new(&args.output_dir);
        let trace_path = exporter.write_trace(&result.trace)?;
        exporter.append_report(&report)?;
        println!("Trace ready for the visualizer: {}", trace_path.display());
    }

    Ok(())
}
