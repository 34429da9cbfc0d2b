// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj-admin` help and usage output.

use assert_cmd::Command;

#[test]
fn no_args_shows_usage_and_exits_nonzero() {
    let output = Command::cargo_bin("oj-admin").unwrap().output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage:"));
}

#[test]
fn help_lists_every_subcommand() {
    let output = Command::cargo_bin("oj-admin")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["serve", "create-tables", "delete-tables", "resubmit", "show"] {
        assert!(stdout.contains(name), "help text missing {name:?}:\n{stdout}");
    }
}

#[test]
fn serve_help_shows_daemonize_flag() {
    let output = Command::cargo_bin("oj-admin")
        .unwrap()
        .args(["serve", "--help"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("--daemonize"));
}

#[test]
fn version_shows_version() {
    let output = Command::cargo_bin("oj-admin")
        .unwrap()
        .arg("--version")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}
