//! Logger configuration.
//!
//! A `LoggerConfig` can be built in code, loaded from YAML, and patched from
//! `ZLOG_*` environment variables.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LoggerError, Result};
use crate::level::Level;

/// Default rotation size when `max_size_mb` is 0.
pub const DEFAULT_MAX_SIZE_MB: u64 = 100;

pub const ENV_FILE: &str = "ZLOG_FILE";
pub const ENV_LEVEL: &str = "ZLOG_LEVEL";
pub const ENV_MODE: &str = "ZLOG_MODE";
pub const ENV_MAX_SIZE_MB: &str = "ZLOG_MAX_SIZE_MB";
pub const ENV_MAX_BACKUPS: &str = "ZLOG_MAX_BACKUPS";
pub const ENV_MAX_AGE_DAYS: &str = "ZLOG_MAX_AGE_DAYS";

/// Operating posture. Picks the default sinks and caller annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Mode {
    /// File plus console.
    Dev,
    /// Console only, with caller annotation.
    Custom,
    /// File only.
    #[default]
    Prod,
}

impl Mode {
    /// Unknown names fall back to `Prod`.
    pub fn from_name(name: &str) -> Mode {
        match name {
            "dev" => Mode::Dev,
            "custom" => Mode::Custom,
            _ => Mode::Prod,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Dev => "dev",
            Mode::Custom => "custom",
            Mode::Prod => "prod",
        }
    }

    pub fn writes_file(self) -> bool {
        !matches!(self, Mode::Custom)
    }

    pub fn writes_console(self) -> bool {
        matches!(self, Mode::Dev | Mode::Custom)
    }

    pub fn annotates_caller(self) -> bool {
        matches!(self, Mode::Custom)
    }
}

impl From<String> for Mode {
    fn from(name: String) -> Self {
        Mode::from_name(&name)
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        mode.name().to_string()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything needed to build a [`crate::Logger`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    pub file_path: PathBuf,

    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub mode: Mode,

    /// Rotate once the file would grow past this many MiB. 0 means the default.
    #[serde(default)]
    pub max_size_mb: u64,

    /// Rotated files to keep. 0 keeps all of them.
    #[serde(default)]
    pub max_backups: usize,

    /// Remove rotated files older than this. 0 disables age pruning.
    #[serde(default)]
    pub max_age_days: u64,

    /// Logger name written after the level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Overrides the mode's console choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console: Option<bool>,

    /// Overrides the mode's caller annotation choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<bool>,

    /// Hand file writes to a background worker.
    #[serde(default)]
    pub buffered: bool,

    /// Attach a backtrace to records at or above this level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacktrace_level: Option<String>,
}

fn default_level() -> String {
    Level::Info.name().to_string()
}

impl LoggerConfig {
    pub fn new(
        file_path: impl Into<PathBuf>,
        level: impl Into<String>,
        mode: Mode,
        max_size_mb: u64,
        max_backups: usize,
        max_age_days: u64,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            level: level.into(),
            mode,
            max_size_mb,
            max_backups,
            max_age_days,
            name: None,
            console: None,
            caller: None,
            buffered: false,
            stacktrace_level: None,
        }
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| LoggerError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Apply `ZLOG_*` overrides from the process environment.
    pub fn apply_env_overrides(self) -> Result<Self> {
        self.apply_env_overrides_with(&std::env::vars().collect())
    }

    /// Apply `ZLOG_*` overrides from the given map (useful for testing).
    pub fn apply_env_overrides_with(mut self, env: &HashMap<String, String>) -> Result<Self> {
        let get = |var: &str| env.get(var).filter(|v| !v.is_empty());

        if let Some(path) = get(ENV_FILE) {
            self.file_path = PathBuf::from(path);
        }
        if let Some(level) = get(ENV_LEVEL) {
            self.level = level.clone();
        }
        if let Some(mode) = get(ENV_MODE) {
            self.mode = Mode::from_name(mode);
        }
        if let Some(raw) = get(ENV_MAX_SIZE_MB) {
            self.max_size_mb = parse_env(ENV_MAX_SIZE_MB, raw)?;
        }
        if let Some(raw) = get(ENV_MAX_BACKUPS) {
            self.max_backups = parse_env(ENV_MAX_BACKUPS, raw)?;
        }
        if let Some(raw) = get(ENV_MAX_AGE_DAYS) {
            self.max_age_days = parse_env(ENV_MAX_AGE_DAYS, raw)?;
        }
        Ok(self)
    }

    /// Severity threshold; unknown names resolve to `info`.
    pub fn threshold(&self) -> Level {
        Level::resolve(&self.level)
    }

    pub fn stacktrace_threshold(&self) -> Option<Level> {
        self.stacktrace_level.as_deref().and_then(Level::from_name)
    }

    pub fn writes_file(&self) -> bool {
        self.mode.writes_file()
    }

    pub fn writes_console(&self) -> bool {
        self.console.unwrap_or_else(|| self.mode.writes_console())
    }

    pub fn annotates_caller(&self) -> bool {
        self.caller.unwrap_or_else(|| self.mode.annotates_caller())
    }

    pub fn max_size_bytes(&self) -> u64 {
        let mb = if self.max_size_mb == 0 {
            DEFAULT_MAX_SIZE_MB
        } else {
            self.max_size_mb
        };
        mb.saturating_mul(1024 * 1024)
    }
}

fn parse_env<T: std::str::FromStr>(var: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| LoggerError::InvalidEnv {
        var: var.to_string(),
        value: raw.to_string(),
    })
}
