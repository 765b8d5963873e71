//! End-to-end tests for the `cmdhelp` binary

use std::process::{Command, Output};
use tempfile::TempDir;

fn cmdhelp(temp_dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cmdhelp"))
        .args(args)
        .current_dir(temp_dir.path())
        .env("CMDHELP_CONFIG", temp_dir.path().join("absent.toml"))
        .env("CMDHELP_STORAGE_ROOT", temp_dir.path().join("staging"))
        .env("CMDHELP_LOG_LEVEL", "warn")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn staging_is_empty(temp_dir: &TempDir) -> bool {
    let staging = temp_dir.path().join("staging");
    !staging.exists() || std::fs::read_dir(staging).unwrap().next().is_none()
}

#[test]
fn missing_required_argument_prints_usage() {
    let temp_dir = TempDir::new().unwrap();
    let output = cmdhelp(&temp_dir, &["--app=/bin/echo"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--path"));
    assert!(staging_is_empty(&temp_dir));
}

#[test]
fn invalid_log_directory_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let log = temp_dir.path().join("missing").join("out.log");
    let output = cmdhelp(
        &temp_dir,
        &["--app=/bin/echo", "--path=/", &format!("--log={}", log.display())],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid directory"));
    assert!(staging_is_empty(&temp_dir));
}

#[cfg(unix)]
#[test]
fn run_writes_log_and_removes_script() {
    let temp_dir = TempDir::new().unwrap();
    let log = temp_dir.path().join("acl.log");
    let log_arg = format!("--log={}", log.display());

    let output = cmdhelp(&temp_dir, &["-aecho", "--path=/srv/shared data", &log_arg]);
    assert!(output.status.success(), "{output:?}");
    assert!(output.stdout.is_empty());
    assert_eq!(std::fs::read_to_string(&log).unwrap(), "/srv/shared data\n");

    let output = cmdhelp(
        &temp_dir,
        &["-aecho", "-p/srv", &log_arg, "--appendToLogFile"],
    );
    assert!(output.status.success());
    assert_eq!(
        std::fs::read_to_string(&log).unwrap(),
        "/srv/shared data\n/srv\n"
    );
    assert!(staging_is_empty(&temp_dir));
}

#[cfg(unix)]
#[test]
fn run_without_log_echoes_output() {
    let temp_dir = TempDir::new().unwrap();
    let output = cmdhelp(&temp_dir, &["--app=echo", "--path=/"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "/\n");
    assert!(!temp_dir.path().join("acl.log").exists());
}
