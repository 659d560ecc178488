use chart::{Chart, Series, MODEL_COLOR, RAW_COLOR};
use clutchcore::trace::{AxisBounds, SimulationTrace};
use iced::{
    time,
    widget::{button, column, row, scrollable, text, Canvas, Column, Container},
    Alignment, Element, Length, Subscription, Task, Theme,
};
use log::warn;
use std::{path::PathBuf, time::Duration};

mod chart;

const DEFAULT_TRACE: &str = "tools/data/sine-sweep.json";

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(state: &Visualizer) -> String {
    match &state.trace {
        Some(trace) => format!("Clutch Servo Visualizer - {}", trace.scenario),
        None => "Clutch Servo Visualizer".into(),
    }
}

fn application_subscription(_: &Visualizer) -> Subscription<Message> {
    time::every(Duration::from_secs(1)).map(|_| Message::Tick)
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

#[derive(Debug)]
struct Visualizer {
    trace_path: PathBuf,
    trace: Option<SimulationTrace>,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    Reload,
    TraceLoaded(Result<SimulationTrace, String>),
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        let trace_path = std::env::args()
            .nth(1)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TRACE));
        (
            Visualizer {
                trace_path: trace_path.clone(),
                trace: None,
                status: format!("Waiting for {}...", trace_path.display()),
                history: Vec::new(),
            },
            Task::perform(load_trace(trace_path), Message::TraceLoaded),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick | Message::Reload => {
                Task::perform(load_trace(state.trace_path.clone()), Message::TraceLoaded)
            }
            Message::TraceLoaded(Ok(trace)) => {
                if state.trace.as_ref() != Some(&trace) {
                    state.status = format!(
                        "Loaded {}: {} samples, alpha {}",
                        trace.scenario,
                        trace.len(),
                        trace.summary.filter_factor
                    );
                    state.push_history(format!(
                        "Trace {} ({} samples)",
                        trace.scenario,
                        trace.len()
                    ));
                    state.trace = Some(trace);
                }
                Task::none()
            }
            Message::TraceLoaded(Err(err)) => {
                if state.trace.is_none() {
                    state.status = format!("Trace error: {err}");
                } else {
                    warn!("keeping previous trace: {err}");
                }
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let summary_column = match &state.trace {
            Some(trace) => summary_lines(trace),
            None => Column::new().push(text("No trace loaded").size(14)),
        };

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let side_column = column![
            text("Run").size(26),
            text(state.trace_path.display().to_string()).size(12),
            button("Reload").on_press(Message::Reload).padding(10),
            text(&state.status).size(14),
            text("Summary").size(18),
            summary_column,
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(120.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(320.0));

        let figures = match &state.trace {
            Some(trace) => figures(trace),
            None => Column::new().push(text("Run the simulator to produce a trace.").size(16)),
        };

        let layout = row![side_column, scrollable(figures).width(Length::Fill)]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

fn summary_lines(trace: &SimulationTrace) -> Column<'_, Message> {
    let summary = &trace.summary;
    let gain = match (summary.measured_gain, summary.analytic_gain) {
        (Some(measured), Some(analytic)) => {
            format!("Filter gain {measured:.3} (analytic {analytic:.3})")
        }
        _ => "Filter gain n/a".into(),
    };
    let period = summary
        .dominant_period
        .map(|p| format!("Dominant period {p:.1} samples"))
        .unwrap_or_else(|| "Dominant period n/a".into());

    let mut lines = column![
        text(format!("Filter factor {}", summary.filter_factor)).size(12),
        text(gain).size(12),
        text(period).size(12),
        text(format!("Duty clamped {} samples", summary.clamped_duty)).size(12),
        text(format!("Ramp saturated {} steps", summary.saturated_ramp)).size(12),
    ]
    .spacing(4);
    for note in &summary.notes {
        lines = lines.push(text(note.clone()).size(11));
    }
    lines
}

fn figures(trace: &SimulationTrace) -> Column<'_, Message> {
    let time_bounds = match (trace.time.first(), trace.time.last()) {
        (Some(&first), Some(&last)) => AxisBounds::new(first as f64, last as f64),
        _ => AxisBounds::UNIT,
    };

    let position = Chart::new(time_bounds, trace.position_bounds)
        .push(Series::line(&trace.time, &trace.raw, RAW_COLOR))
        .push(Series::line(&trace.time, &trace.filtered, MODEL_COLOR));
    let duty = Chart::new(time_bounds, trace.duty_bounds)
        .push(Series::line(&trace.time, &trace.duty_cycle, MODEL_COLOR));
    let angle = Chart::new(time_bounds, trace.angle_bounds)
        .push(Series::line(&trace.time, &trace.ramp_angle, RAW_COLOR))
        .push(Series::line(&trace.time, &trace.commanded_angle, MODEL_COLOR));
    let shape = Chart::new(AxisBounds::UNIT, AxisBounds::UNIT).push(Series {
        points: trace.curve_shape.iter().map(|p| (p[0], p[1])).collect(),
        color: MODEL_COLOR,
        markers: true,
    });

    column![
        figure_title("Position: raw (grey) vs filtered (blue)", &trace.position_bounds),
        figure(position, 240.0),
        figure_title("Duty cycle", &trace.duty_bounds),
        figure(duty, 200.0),
        figure_title(
            "Servo angle: ramp (grey) vs duty-derived (blue)",
            &trace.angle_bounds
        ),
        figure(angle, 240.0),
        figure_title("Normalized curve shape", &AxisBounds::UNIT),
        figure(shape, 240.0),
    ]
    .spacing(10)
    .padding(16)
}

fn figure_title<'a>(title: &str, bounds: &AxisBounds) -> Element<'a, Message> {
    text(format!("{title}  [{:.3} .. {:.3}]", bounds.min, bounds.max))
        .size(16)
        .into()
}

fn figure<'a>(chart: Chart, height: f32) -> Element<'a, Message> {
    Canvas::new(chart)
        .width(Length::Fill)
        .height(Length::Fixed(height))
        .into()
}

async fn load_trace(path: PathBuf) -> Result<SimulationTrace, String> {
    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| format!("{}: {e}", path.display()))?;
    let trace = SimulationTrace::from_json(&contents).map_err(|e| e.to_string())?;
    if !trace.is_consistent() {
        return Err(format!("{}: series lengths differ", path.display()));
    }
    Ok(trace)
}
