//! Colorful console output for calibration runs.
//!
//! Provides a custom `tracing` layer that renders the structured events of
//! the calibtour crates (`event = "..."` plus fields) as colored lines on
//! stderr, so stdout stays free for command output.

use std::io::{self, Write};
use std::sync::OnceLock;

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "calibtour=info";

static INIT: OnceLock<()> = OnceLock::new();

/// Initializes console output with `RUST_LOG` or [`DEFAULT_FILTER`].
///
/// Safe to call multiple times - only the first call has effect.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    install(filter);
}

/// Initializes console output with explicit filter directives, ignoring
/// `RUST_LOG`.
pub fn init_with(directives: &str) {
    install(EnvFilter::new(directives));
}

fn install(filter: EnvFilter) {
    INIT.get_or_init(|| {
        print_banner();
        // Another subscriber may already be set by the host; keep it.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(CalibrationConsoleLayer)
            .try_init();
    });
}

fn print_banner() {
    let line = format!(
        "calibtour v{} - calibration tour planner",
        env!("CARGO_PKG_VERSION")
    );
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "{}", line.bright_cyan().bold());
    let _ = stderr.flush();
}

/// A tracing layer that formats calibtour events with colors.
pub struct CalibrationConsoleLayer;

impl<S: Subscriber> Layer<S> for CalibrationConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("calibtour") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(*metadata.level(), &visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stderr(), "{}", output);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl FieldValue {
    fn render(&self) -> String {
        match self {
            Self::Int(v) => v.to_formatted_string(&Locale::en),
            Self::Float(v) => format_cost(*v),
            Self::Text(v) => v.clone(),
            Self::Bool(v) => v.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct EventVisitor {
    event: Option<String>,
    message: Option<String>,
    fields: Vec<(&'static str, FieldValue)>,
}

impl EventVisitor {
    fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    fn int(&self, name: &str) -> i64 {
        match self.get(name) {
            Some(FieldValue::Int(v)) => *v,
            _ => 0,
        }
    }

    fn float(&self, name: &str) -> f64 {
        match self.get(name) {
            Some(FieldValue::Float(v)) => *v,
            Some(FieldValue::Int(v)) => *v as f64,
            _ => 0.0,
        }
    }

    fn text(&self, name: &str) -> &str {
        match self.get(name) {
            Some(FieldValue::Text(v)) => v,
            _ => "",
        }
    }

    fn push(&mut self, field: &Field, value: FieldValue) {
        match field.name() {
            "event" => {
                if let FieldValue::Text(s) = value {
                    self.event = Some(s);
                }
            }
            "message" => self.message = Some(value.render()),
            name => self.fields.push((name, value)),
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        self.push(field, FieldValue::Text(s.trim_matches('"').to_string()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, FieldValue::Int(i64::try_from(value).unwrap_or(i64::MAX)));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, FieldValue::Int(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, FieldValue::Float(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, FieldValue::Bool(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, FieldValue::Text(value.to_string()));
    }
}

fn format_event(level: Level, v: &EventVisitor) -> String {
    let event = v.event.as_deref().unwrap_or("");
    match event {
        "calibration_start" => format!(
            "{} {} {} {} targets, {} ordering",
            timestamp().bright_black(),
            level_tag(level),
            "[Calibration]".bright_cyan(),
            v.int("targets").to_formatted_string(&Locale::en).bright_yellow(),
            v.text("strategy").white().bold(),
        ),
        "matrix_built" => format!(
            "{} {} {} distance matrix {}x{} ({} pairs) in {}",
            timestamp().bright_black(),
            level_tag(level),
            "[Tour]".bright_cyan(),
            v.int("size"),
            v.int("size"),
            v.int("pairs").to_formatted_string(&Locale::en).bright_yellow(),
            format_duration_ms(v.int("duration_ms")).yellow(),
        ),
        "tour_solve_end" => format!(
            "{} {} {} tour cost {} (input order {})",
            timestamp().bright_black(),
            level_tag(level),
            "[Tour]".bright_cyan(),
            format_cost(v.float("tour_cost")).bright_green().bold(),
            format_cost(v.float("input_order_cost")).white(),
        ),
        "segment_planned" => {
            let kind = v.text("kind");
            let label = match v.get("handle") {
                Some(handle) => format!("contact on {}", handle.render()),
                None => kind.replace('_', " "),
            };
            format!(
                "    {} Segment {:>4} | {} | {} pieces",
                "->".bright_blue(),
                v.int("segment").to_formatted_string(&Locale::en).white(),
                label.white().bold(),
                v.int("pieces"),
            )
        }
        "trajectory_merged" => format!(
            "{} {} {} {} segments merged into one path ({} pieces kept, {} discarded)",
            timestamp().bright_black(),
            level_tag(level),
            "[Trajectory]".bright_cyan(),
            v.int("segments").to_formatted_string(&Locale::en).bright_yellow(),
            v.int("pieces").to_formatted_string(&Locale::en),
            v.int("discarded").to_formatted_string(&Locale::en),
        ),
        "calibration_end" => format!(
            "{} {} {} Calibration ended: {} segments, {} solves, time spent ({})",
            timestamp().bright_black(),
            level_tag(level),
            "[Calibration]".bright_cyan(),
            v.int("segments").to_formatted_string(&Locale::en).bright_yellow(),
            v.int("solves").to_formatted_string(&Locale::en).bright_yellow(),
            format_duration_ms(v.int("duration_ms")).yellow(),
        ),
        "" => match &v.message {
            Some(message) => format!(
                "{} {} {}",
                timestamp().bright_black(),
                level_tag(level),
                message
            ),
            None => String::new(),
        },
        other => format_generic(level, other, v),
    }
}

fn format_generic(level: Level, event: &str, v: &EventVisitor) -> String {
    let fields: Vec<String> = v
        .fields
        .iter()
        .map(|(name, value)| format!("{}={}", name.bright_black(), value.render()))
        .collect();
    format!(
        "{} {} {} {}",
        timestamp().bright_black(),
        level_tag(level),
        event.cyan(),
        fields.join(" ")
    )
}

fn level_tag(level: Level) -> String {
    match level {
        Level::ERROR => "ERROR".bright_red().bold().to_string(),
        Level::WARN => " WARN".yellow().bold().to_string(),
        Level::INFO => " INFO".bright_green().to_string(),
        Level::DEBUG => "DEBUG".bright_blue().to_string(),
        Level::TRACE => "TRACE".bright_black().to_string(),
    }
}

fn timestamp() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| {
            let secs = d.as_secs() % 100000;
            let millis = d.subsec_millis();
            format!("{:5}.{:03}", secs, millis)
        })
        .unwrap_or_else(|_| "    0.000".to_string())
}

fn format_duration_ms(ms: i64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

fn format_cost(cost: f64) -> String {
    format!("{:.4}", cost)
}
