//! Drives the real `zlog` binary for behavior that ends the process.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn zlog(args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_zlog"));
    for var in [
        "ZLOG_FILE",
        "ZLOG_LEVEL",
        "ZLOG_MODE",
        "ZLOG_MAX_SIZE_MB",
        "ZLOG_MAX_BACKUPS",
        "ZLOG_MAX_AGE_DAYS",
    ] {
        cmd.env_remove(var);
    }
    cmd.args(args).output().unwrap()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_emit_writes_file_only_in_prod() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("app.log");

    let out = zlog(&["--file", path_arg(&log), "emit", "info", "hello", "world"]);
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
    assert!(fs::read_to_string(&log).unwrap().contains(" INFO hello world\n"));
}

#[test]
fn test_dev_mode_duplicates_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("app.log");

    let out = zlog(&["--file", path_arg(&log), "--mode", "dev", "emit", "warn", "careful"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains(" WARN careful\n"));
    assert!(fs::read_to_string(&log).unwrap().contains(" WARN careful\n"));
}

#[test]
fn test_threshold_suppresses_debug() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("app.log");

    let out = zlog(&["--file", path_arg(&log), "--level", "warn", "emit", "debug", "value=42"]);
    assert!(out.status.success());
    assert_eq!(fs::read_to_string(&log).unwrap(), "");
}

#[test]
fn test_json_command() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("app.log");

    let out = zlog(&["--file", path_arg(&log), "--level", "debug", "json", r#"{"name":"x"}"#]);
    assert!(out.status.success());
    assert!(fs::read_to_string(&log).unwrap().contains(r#" DEBUG {"name":"x"}"#));
}

#[test]
fn test_unwritable_path_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("no-such-dir").join("app.log");

    let out = zlog(&["--file", path_arg(&log), "emit", "info", "never"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("cannot create log file"));
    assert!(!log.exists());
}

#[test]
fn test_fatal_exits_non_zero_after_writing() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("app.log");

    let out = zlog(&["--file", path_arg(&log), "emit", "fatal", "out of disk"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(fs::read_to_string(&log).unwrap().contains(" FATAL out of disk\n"));
}

#[test]
fn test_show_prints_resolved_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("zlog.yaml");
    fs::write(&config, "filePath: a.log\nlevel: debug\nmaxBackups: 4\n").unwrap();

    let out = zlog(&["--config", path_arg(&config), "--mode", "dev", "show"]);
    assert!(out.status.success());
    let yaml = String::from_utf8_lossy(&out.stdout);
    assert!(yaml.contains("filePath: a.log"));
    assert!(yaml.contains("level: debug"));
    assert!(yaml.contains("mode: dev"));
    assert!(yaml.contains("maxBackups: 4"));
}

#[test]
fn test_unknown_emit_level_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("app.log");

    let out = zlog(&["--file", path_arg(&log), "emit", "loud", "x"]);
    assert!(!out.status.success());
    assert!(!log.exists());
}
