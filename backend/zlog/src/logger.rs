//! Logger handle.
//!
//! A [`Logger`] owns its own `tracing` dispatcher built from a
//! [`LoggerConfig`]: a `LineFormat` layer for the rotating file, another for
//! the console, both behind a level filter. Handles built here are
//! independent of the process-wide one in [`crate::facade`], which makes them
//! usable from tests.

use std::backtrace::Backtrace;
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::Dispatch;
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;

use crate::config::{LoggerConfig, Mode};
use crate::error::{LoggerError, Result};
use crate::exit::{ExitHook, ProcessExit};
use crate::format::{short_caller, LineFormat};
use crate::level::Level;
use crate::rotate::{RotatingFile, RotationPolicy};

/// Target attached to every record emitted through a `Logger`.
pub const TARGET: &str = "zlog";

/// Exit code used by `fatal` records.
pub const FATAL_EXIT_CODE: i32 = 1;

/// Dispatch one event at a `tracing` level chosen at runtime. `event!` needs
/// a constant level, hence the match.
macro_rules! event_at {
    ($level:expr, $($rest:tt)+) => {
        match $level {
            Level::Debug => tracing::event!(target: TARGET, tracing::Level::DEBUG, $($rest)+),
            Level::Info => tracing::event!(target: TARGET, tracing::Level::INFO, $($rest)+),
            Level::Warn => tracing::event!(target: TARGET, tracing::Level::WARN, $($rest)+),
            Level::Error | Level::DPanic | Level::Panic | Level::Fatal => {
                tracing::event!(target: TARGET, tracing::Level::ERROR, $($rest)+)
            }
        }
    };
}

#[derive(Debug)]
pub struct Logger {
    dispatch: Dispatch,
    path: PathBuf,
    threshold: Level,
    mode: Mode,
    caller: bool,
    stacktrace: Option<Level>,
    file: Option<RotatingFile>,
    guard: Mutex<Option<WorkerGuard>>,
    exit: Arc<dyn ExitHook>,
}

pub struct LoggerBuilder {
    config: LoggerConfig,
    console: Option<BoxMakeWriter>,
    exit: Arc<dyn ExitHook>,
}

impl LoggerBuilder {
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            config,
            console: None,
            exit: Arc::new(ProcessExit),
        }
    }

    /// Replace stdout as the console destination.
    pub fn console_writer<W>(mut self, writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        self.console = Some(BoxMakeWriter::new(writer));
        self
    }

    /// Replace `std::process::exit` for `fatal` records.
    pub fn exit_hook(mut self, hook: Arc<dyn ExitHook>) -> Self {
        self.exit = hook;
        self
    }

    pub fn build(self) -> Result<Logger> {
        let config = self.config;
        let threshold = config.threshold();
        let caller = config.annotates_caller();
        let stacktrace = config.stacktrace_threshold();

        ensure_file(&config.file_path)?;

        let format = LineFormat::new(config.name.clone(), caller);
        let mut guard = None;

        let file = if config.writes_file() {
            let policy = RotationPolicy::new(
                config.max_size_bytes(),
                config.max_backups,
                config.max_age_days,
            );
            let file = RotatingFile::open(&config.file_path, policy).map_err(|source| {
                LoggerError::OpenFile {
                    path: config.file_path.clone(),
                    source,
                }
            })?;
            Some(file)
        } else {
            None
        };

        let file_layer = file.as_ref().map(|file| {
            let writer = if config.buffered {
                let (non_blocking, worker) = NonBlockingBuilder::default()
                    .lossy(false)
                    .finish(file.clone());
                guard = Some(worker);
                BoxMakeWriter::new(non_blocking)
            } else {
                BoxMakeWriter::new(file.clone())
            };
            tracing_subscriber::fmt::layer()
                .event_format(format.clone())
                .with_writer(writer)
                .with_ansi(false)
        });

        let console_layer = config.writes_console().then(|| {
            let writer = self
                .console
                .unwrap_or_else(|| BoxMakeWriter::new(io::stdout));
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(writer)
                .with_ansi(false)
        });

        let subscriber = tracing_subscriber::registry()
            .with(LevelFilter::from_level(threshold.as_tracing()))
            .with(file_layer)
            .with(console_layer);

        Ok(Logger {
            dispatch: Dispatch::new(subscriber),
            path: config.file_path,
            threshold,
            mode: config.mode,
            caller,
            stacktrace,
            file,
            guard: Mutex::new(guard),
            exit: self.exit,
        })
    }
}

/// Create `path` if it does not exist yet, without writing to it.
fn ensure_file(path: &Path) -> Result<()> {
    if path.metadata().is_ok() {
        return Ok(());
    }
    File::create(path)
        .map(drop)
        .map_err(|source| LoggerError::CreateFile {
            path: path.to_path_buf(),
            source,
        })
}

impl Logger {
    pub fn builder(config: LoggerConfig) -> LoggerBuilder {
        LoggerBuilder::new(config)
    }

    pub fn threshold(&self) -> Level {
        self.threshold
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn annotates_caller(&self) -> bool {
        self.caller
    }

    /// The dispatcher records are sent to. Install it as the global default to
    /// route plain `tracing` macros into the same sinks.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.threshold
    }

    /// Write a record at `level`, then apply the level's terminal behavior:
    /// `panic` always panics, `dpanic` panics in dev mode, `fatal` flushes and
    /// exits. Terminal behavior applies even when the record is filtered out.
    #[track_caller]
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if self.enabled(level) {
            self.write(level, args, Location::caller());
        }

        match level {
            Level::Panic => panic!("{args}"),
            Level::DPanic if self.mode == Mode::Dev => panic!("{args}"),
            Level::Fatal => {
                self.close();
                self.exit.exit(FATAL_EXIT_CODE);
            }
            _ => {}
        }
    }

    fn write(&self, level: Level, args: fmt::Arguments<'_>, location: &Location<'_>) {
        let caller = self
            .caller
            .then(|| short_caller(location.file(), location.line()));
        let stacktrace = self
            .stacktrace
            .filter(|min| level >= *min)
            .map(|_| Backtrace::force_capture().to_string());

        tracing::dispatcher::with_default(&self.dispatch, || {
            event_at!(
                level,
                severity = level.label(),
                caller = caller.as_deref(),
                stacktrace = stacktrace.as_deref(),
                "{}",
                args
            )
        });
    }

    /// Flush the file sink and stdout. In buffered mode this also drains and
    /// stops the background writer; later records are dropped.
    pub fn close(&self) {
        drop(
            self.guard
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        );
        if let Some(mut file) = self.file.clone() {
            if let Err(e) = file.flush() {
                eprintln!("zlog: failed to flush {}: {}", self.path.display(), e);
            }
        }
        let _ = io::stdout().flush();
    }

    /// Emit `value` as compact JSON at debug. A value that fails to serialize
    /// yields an empty body.
    #[track_caller]
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) {
        if !self.enabled(Level::Debug) {
            return;
        }
        let body = serde_json::to_string(value).unwrap_or_default();
        self.log(Level::Debug, format_args!("{body}"));
    }

    #[track_caller]
    pub fn debug(&self, msg: impl fmt::Display) {
        self.log(Level::Debug, format_args!("{msg}"));
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    #[track_caller]
    pub fn info(&self, msg: impl fmt::Display) {
        self.log(Level::Info, format_args!("{msg}"));
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    #[track_caller]
    pub fn warn(&self, msg: impl fmt::Display) {
        self.log(Level::Warn, format_args!("{msg}"));
    }

    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    #[track_caller]
    pub fn error(&self, msg: impl fmt::Display) {
        self.log(Level::Error, format_args!("{msg}"));
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    #[track_caller]
    pub fn dpanic(&self, msg: impl fmt::Display) {
        self.log(Level::DPanic, format_args!("{msg}"));
    }

    #[track_caller]
    pub fn dpanicf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::DPanic, args);
    }

    #[track_caller]
    pub fn panic(&self, msg: impl fmt::Display) {
        self.log(Level::Panic, format_args!("{msg}"));
    }

    #[track_caller]
    pub fn panicf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Panic, args);
    }

    #[track_caller]
    pub fn fatal(&self, msg: impl fmt::Display) {
        self.log(Level::Fatal, format_args!("{msg}"));
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Fatal, args);
    }
}
