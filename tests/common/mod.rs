#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use assert_cmd::Command;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated home directory for one test.
pub fn test_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// A script-mode invocation of the shell rooted at `home`.
pub fn shell(home: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("budgetwise").expect("binary built");
    cmd.env("BUDGETWISE_CLI_SCRIPT", "1")
        .env("BUDGETWISE_HOME", home)
        .env("RUST_LOG", "off");
    cmd
}

/// Runs `lines` through the shell and returns stdout.
pub fn run_script(home: &PathBuf, lines: &[&str]) -> String {
    let mut input = lines.join("\n");
    input.push('\n');
    let output = shell(home)
        .write_stdin(input)
        .output()
        .expect("run shell");
    assert!(output.status.success(), "shell exited with failure");
    String::from_utf8(output.stdout).expect("utf8 stdout")
}

pub const SIGN_UP: &[&str] = &[
    "register \"Grace Hopper\" grace@example.com cobol1959",
    "login grace@example.com cobol1959",
];
