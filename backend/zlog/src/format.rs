//! Line encoder.
//!
//! Renders one record per line:
//! `<timestamp> <LEVEL> [<name>] [<caller>] <message> [key=value ...]`,
//! with an optional backtrace on the following lines.

use std::fmt;

use chrono::Local;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SEVERITY_FIELD: &str = "severity";
const CALLER_FIELD: &str = "caller";
const STACKTRACE_FIELD: &str = "stacktrace";
const MESSAGE_FIELD: &str = "message";

/// Human-readable `FormatEvent` shared by the file and console layers.
#[derive(Debug, Clone, Default)]
pub struct LineFormat {
    name: Option<String>,
    caller: bool,
}

impl LineFormat {
    pub fn new(name: Option<String>, caller: bool) -> Self {
        Self { name, caller }
    }
}

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut record = RecordVisitor::default();
        event.record(&mut record);
        let meta = event.metadata();

        write!(writer, "{}", Local::now().format(TIME_FORMAT))?;
        match &record.severity {
            Some(label) => write!(writer, " {label}")?,
            None => write!(writer, " {}", meta.level())?,
        }
        if let Some(name) = &self.name {
            write!(writer, " {name}")?;
        }
        if self.caller {
            if let Some(caller) = &record.caller {
                write!(writer, " {caller}")?;
            } else if let (Some(file), Some(line)) = (meta.file(), meta.line()) {
                write!(writer, " {}", short_caller(file, line))?;
            }
        }
        write!(writer, " {}", record.message)?;
        for (key, value) in &record.fields {
            write!(writer, " {key}={value}")?;
        }
        if let Some(stacktrace) = &record.stacktrace {
            write!(writer, "\n{}", stacktrace.trim_end())?;
        }
        writeln!(writer)
    }
}

/// Trim a source path down to its last directory and file name.
pub fn short_caller(file: &str, line: u32) -> String {
    let normalized = file.replace('\\', "/");
    let mut parts = normalized.rsplitn(3, '/');
    let name = parts.next().unwrap_or_default();
    match parts.next() {
        Some(dir) => format!("{dir}/{name}:{line}"),
        None => format!("{name}:{line}"),
    }
}

#[derive(Debug, Default)]
struct RecordVisitor {
    message: String,
    severity: Option<String>,
    caller: Option<String>,
    stacktrace: Option<String>,
    fields: Vec<(&'static str, String)>,
}

impl RecordVisitor {
    fn put(&mut self, field: &Field, value: String) {
        match field.name() {
            MESSAGE_FIELD => self.message = value,
            SEVERITY_FIELD => self.severity = Some(value),
            CALLER_FIELD => self.caller = Some(value),
            STACKTRACE_FIELD => self.stacktrace = Some(value),
            name => self.fields.push((name, value)),
        }
    }
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{value:?}"));
    }
}
