// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj-admin` error reporting: bad config, missing/non-failed jobs.

use assert_cmd::Command;

use crate::prelude::{require_database, Harness};

#[test]
fn missing_config_file_is_reported() {
    let output = Command::cargo_bin("oj-admin")
        .unwrap()
        .args(["--config", "/nonexistent/config.toml", "show", "j1"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn archive_after_expire_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("backend.toml"), "user = \"x\"\npasswd = \"y\"\n").unwrap();
    let config = format!(
        r#"
[general]
admin_email = "admin@example.com"
service_name = "bad"
state_file = "{state_file}"
socket = "{socket}"
check_minutes = 1

[database]
db = "postgres://localhost/bad"
backend_config = "backend.toml"

[directories]
install = "{install}"
incoming = "{install}/incoming"
preprocessing = "{install}/incoming"

[oldjobs]
archive = "60d"
expire = "30d"
"#,
        state_file = dir.path().join("bad.state").display(),
        socket = dir.path().join("bad.sock").display(),
        install = dir.path().display(),
    );
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, config).unwrap();

    let output = Command::cargo_bin("oj-admin")
        .unwrap()
        .args(["--config", config_path.to_str().unwrap(), "show", "j1"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
#[serial_test::serial(jobsvc_db)]
fn show_of_unknown_job_reports_not_found() {
    let url = require_database!();
    let harness = Harness::new(&url);
    assert!(harness.cmd().arg("create-tables").output().unwrap().status.success());

    let output = harness.cmd().args(["show", "no-such-job"]).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));

    harness.cmd().arg("delete-tables").output().unwrap();
}
