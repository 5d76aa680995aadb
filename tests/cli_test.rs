//! CLI smoke tests for the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("toolboxx-assist").expect("binary not built");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("submissions"));
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("toolboxx-assist").expect("binary not built");
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("toolboxx-assist"));
}

#[test]
fn test_unknown_subcommand_fails() {
    let mut cmd = Command::cargo_bin("toolboxx-assist").expect("binary not built");
    cmd.arg("frobnicate").assert().failure();
}

#[test]
fn test_history_requires_subcommand() {
    let mut cmd = Command::cargo_bin("toolboxx-assist").expect("binary not built");
    cmd.arg("history").assert().failure();
}
