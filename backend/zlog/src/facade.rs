//! Process-wide logger and the free emission functions.
//!
//! [`new_logger`] builds the global [`Logger`] exactly once. Emission
//! functions forward to it; before it exists they drop the record, except
//! that `panic` still panics and `fatal` still exits.

use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;

use crate::config::LoggerConfig;
use crate::exit::terminate;
use crate::level::Level;
use crate::logger::{Logger, FATAL_EXIT_CODE};

/// Error record written when `new_logger` runs a second time.
pub const ALREADY_INITIALIZED: &str = "logger already initialized";

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Build the process-wide logger, or return the existing one.
///
/// The first call wins: later calls ignore their config, write one error
/// record and hand back the same logger. If the log file cannot be created
/// the error goes to stderr and the process exits with code 1.
///
/// The new logger also becomes the global `tracing` dispatcher when no other
/// one is installed.
#[track_caller]
pub fn new_logger(config: LoggerConfig) -> &'static Logger {
    let mut created = false;
    let logger = GLOBAL.get_or_init(|| {
        created = true;
        match Logger::builder(config).build() {
            Ok(logger) => logger,
            Err(err) => {
                match std::error::Error::source(&err) {
                    Some(source) => eprintln!("{err}: {source}"),
                    None => eprintln!("{err}"),
                }
                terminate(1)
            }
        }
    });

    if created {
        let _ = tracing::dispatcher::set_global_default(logger.dispatch().clone());
    } else {
        logger.error(ALREADY_INITIALIZED);
    }
    logger
}

/// The process-wide logger, if `new_logger` has run.
pub fn global() -> Option<&'static Logger> {
    GLOBAL.get()
}

/// Flush the process-wide logger. No-op before initialization.
pub fn close() {
    if let Some(logger) = GLOBAL.get() {
        logger.close();
    }
}

#[track_caller]
pub fn log(level: Level, args: fmt::Arguments<'_>) {
    match GLOBAL.get() {
        Some(logger) => logger.log(level, args),
        None => match level {
            Level::Panic => panic!("{args}"),
            Level::Fatal => {
                eprintln!("{args}");
                terminate(FATAL_EXIT_CODE)
            }
            _ => {}
        },
    }
}

#[track_caller]
pub fn json<T: Serialize + ?Sized>(value: &T) {
    if let Some(logger) = GLOBAL.get() {
        logger.json(value);
    }
}

#[track_caller]
pub fn debug(msg: impl fmt::Display) {
    log(Level::Debug, format_args!("{msg}"));
}

#[track_caller]
pub fn debugf(args: fmt::Arguments<'_>) {
    log(Level::Debug, args);
}

#[track_caller]
pub fn info(msg: impl fmt::Display) {
    log(Level::Info, format_args!("{msg}"));
}

#[track_caller]
pub fn infof(args: fmt::Arguments<'_>) {
    log(Level::Info, args);
}

#[track_caller]
pub fn warn(msg: impl fmt::Display) {
    log(Level::Warn, format_args!("{msg}"));
}

#[track_caller]
pub fn warnf(args: fmt::Arguments<'_>) {
    log(Level::Warn, args);
}

#[track_caller]
pub fn error(msg: impl fmt::Display) {
    log(Level::Error, format_args!("{msg}"));
}

#[track_caller]
pub fn errorf(args: fmt::Arguments<'_>) {
    log(Level::Error, args);
}

#[track_caller]
pub fn dpanic(msg: impl fmt::Display) {
    log(Level::DPanic, format_args!("{msg}"));
}

#[track_caller]
pub fn dpanicf(args: fmt::Arguments<'_>) {
    log(Level::DPanic, args);
}

#[track_caller]
pub fn panic(msg: impl fmt::Display) {
    log(Level::Panic, format_args!("{msg}"));
}

#[track_caller]
pub fn panicf(args: fmt::Arguments<'_>) {
    log(Level::Panic, args);
}

#[track_caller]
pub fn fatal(msg: impl fmt::Display) {
    log(Level::Fatal, format_args!("{msg}"));
}

#[track_caller]
pub fn fatalf(args: fmt::Arguments<'_>) {
    log(Level::Fatal, args);
}

/// `debugf!("value={}", 42)` on the process-wide logger.
#[macro_export]
macro_rules! debugf {
    ($($arg:tt)+) => {
        $crate::facade::debugf(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! infof {
    ($($arg:tt)+) => {
        $crate::facade::infof(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! warnf {
    ($($arg:tt)+) => {
        $crate::facade::warnf(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! errorf {
    ($($arg:tt)+) => {
        $crate::facade::errorf(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! dpanicf {
    ($($arg:tt)+) => {
        $crate::facade::dpanicf(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! panicf {
    ($($arg:tt)+) => {
        $crate::facade::panicf(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! fatalf {
    ($($arg:tt)+) => {
        $crate::facade::fatalf(::std::format_args!($($arg)+))
    };
}

/// Concatenates every argument's `Display` output, without separators, and
/// emits the result at debug: `zlog::debug!("took ", ms, "ms")`.
#[macro_export]
macro_rules! debug {
    ($($arg:expr),+ $(,)?) => {
        $crate::facade::debug([$(::std::string::ToString::to_string(&$arg)),+].concat())
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:expr),+ $(,)?) => {
        $crate::facade::info([$(::std::string::ToString::to_string(&$arg)),+].concat())
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:expr),+ $(,)?) => {
        $crate::facade::warn([$(::std::string::ToString::to_string(&$arg)),+].concat())
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:expr),+ $(,)?) => {
        $crate::facade::error([$(::std::string::ToString::to_string(&$arg)),+].concat())
    };
}

#[macro_export]
macro_rules! dpanic {
    ($($arg:expr),+ $(,)?) => {
        $crate::facade::dpanic([$(::std::string::ToString::to_string(&$arg)),+].concat())
    };
}

// Shadows `std::panic!` inside this module from here on.
#[macro_export]
macro_rules! panic {
    ($($arg:expr),+ $(,)?) => {
        $crate::facade::panic([$(::std::string::ToString::to_string(&$arg)),+].concat())
    };
}

#[macro_export]
macro_rules! fatal {
    ($($arg:expr),+ $(,)?) => {
        $crate::facade::fatal([$(::std::string::ToString::to_string(&$arg)),+].concat())
    };
}
