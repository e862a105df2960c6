mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use zlog::Level;

use config::Overrides;

#[derive(Parser)]
#[command(name = "zlog")]
#[command(about = "Write records through the zlog process-wide logger")]
#[command(version)]
struct Cli {
    /// YAML logger config
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log file path
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Threshold: debug, info, warn, error, dpanic, panic, fatal
    #[arg(long, global = true)]
    level: Option<String>,

    /// dev, custom or prod
    #[arg(long, global = true)]
    mode: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit one record at the given level
    Emit {
        #[arg(value_name = "LEVEL")]
        severity: String,
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Emit a JSON document at debug
    Json { value: String },
    /// Print the resolved logger config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = Overrides {
        file: cli.file,
        level: cli.level,
        mode: cli.mode,
    };
    let config = config::resolve(cli.config.as_deref(), overrides)?;

    match cli.command {
        Commands::Show => {
            print!("{}", config.to_yaml()?);
        }
        Commands::Emit { severity, message } => {
            let level = Level::from_name(&severity)
                .with_context(|| format!("Unknown level: {severity}"))?;
            zlog::new_logger(config);
            zlog::log(level, format_args!("{}", message.join(" ")));
            zlog::close();
        }
        Commands::Json { value } => {
            let value: serde_json::Value =
                serde_json::from_str(&value).context("Argument is not valid JSON")?;
            zlog::new_logger(config);
            zlog::json(&value);
            zlog::close();
        }
    }

    Ok(())
}
