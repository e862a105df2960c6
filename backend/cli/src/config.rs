use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use zlog::{LoggerConfig, Mode};

/// Log file used when neither the config file nor the flags name one.
pub const DEFAULT_LOG_FILE: &str = "zlog.log";

/// Settings given on the command line. They win over the config file and
/// the `ZLOG_*` environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub file: Option<PathBuf>,
    pub level: Option<String>,
    pub mode: Option<String>,
}

impl Overrides {
    fn apply(self, mut config: LoggerConfig) -> LoggerConfig {
        if let Some(file) = self.file {
            config.file_path = file;
        }
        if let Some(level) = self.level {
            config.level = level;
        }
        if let Some(mode) = self.mode {
            config.mode = Mode::from_name(&mode);
        }
        config
    }
}

/// Built-in defaults, then the config file, then env, then flags.
pub fn resolve(config_path: Option<&Path>, overrides: Overrides) -> Result<LoggerConfig> {
    resolve_with(config_path, overrides, &std::env::vars().collect())
}

pub fn resolve_with(
    config_path: Option<&Path>,
    overrides: Overrides,
    env: &HashMap<String, String>,
) -> Result<LoggerConfig> {
    let config = match config_path {
        Some(path) => LoggerConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => LoggerConfig::new(DEFAULT_LOG_FILE, "info", Mode::Prod, 0, 0, 0),
    };
    let config = config
        .apply_env_overrides_with(env)
        .context("Failed to apply ZLOG_* environment overrides")?;
    Ok(overrides.apply(config))
}
