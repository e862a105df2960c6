//! Process-wide leveled logger.
//!
//! Builds a `tracing` pipeline from a small [`LoggerConfig`]: human-readable
//! lines, a size-rotated and gzip-compressed log file, optional console
//! duplication and caller annotation. One global instance backs the free
//! functions (`info`, `warnf!`, `json`, ...); standalone [`Logger`] handles
//! can be built for tests.
//!
//! ```no_run
//! use zlog::{LoggerConfig, Mode};
//!
//! zlog::new_logger(LoggerConfig::new("app.log", "debug", Mode::Dev, 100, 5, 30));
//! zlog::info("service started");
//! zlog::debugf!("value={}", 42);
//! zlog::close();
//! ```

pub mod config;
pub mod error;
pub mod exit;
pub mod facade;
pub mod format;
pub mod level;
pub mod logger;
pub mod rotate;

#[cfg(test)]
mod testing;

pub use config::{LoggerConfig, Mode};
pub use error::{LoggerError, Result};
pub use exit::{ExitHook, ProcessExit};
pub use facade::{
    close, debug, debugf, dpanic, dpanicf, error, errorf, fatal, fatalf, global, info, infof,
    json, log, new_logger, panic, panicf, warn, warnf, ALREADY_INITIALIZED,
};
pub use level::Level;
pub use logger::{Logger, LoggerBuilder};
pub use rotate::{RotatingFile, RotationPolicy};
