// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for black-box `oj-admin` specs: build a config/working
//! directory tree, drive the binary via `assert_cmd`, and (for the tests
//! that need one) talk to a real Postgres instance named by
//! `JOBSVC_TEST_DATABASE_URL`.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;

/// A fresh `install` directory tree plus the `oj-admin` config file pointing
/// at it, with a `backend.toml` alongside the config so relative-path
/// resolution is exercised the same way a real deployment uses it.
pub struct Harness {
    dir: tempfile::TempDir,
    config_path: PathBuf,
}

impl Harness {
    pub fn new(db: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let install = dir.path().join("install");
        std::fs::create_dir_all(install.join("incoming")).unwrap();
        std::fs::create_dir_all(install.join("preprocessing")).unwrap();
        std::fs::create_dir_all(install.join("logs")).unwrap();

        std::fs::write(dir.path().join("backend.toml"), "user = \"jobsvc\"\npasswd = \"unused\"\n")
            .unwrap();

        let config = format!(
            r#"
[general]
admin_email = "admin@example.com"
service_name = "spectest"
state_file = "{state_file}"
socket = "{socket}"
check_minutes = 1

[database]
db = "{db}"
backend_config = "backend.toml"

[directories]
install = "{install}"
incoming = "{incoming}"
preprocessing = "{preprocessing}"

[oldjobs]
archive = "30d"
expire = "60d"
"#,
            state_file = dir.path().join("spectest.state").display(),
            socket = dir.path().join("spectest.sock").display(),
            db = db,
            install = install.display(),
            incoming = install.join("incoming").display(),
            preprocessing = install.join("preprocessing").display(),
        );

        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, config).unwrap();

        Harness { dir, config_path }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn install_dir(&self) -> PathBuf {
        self.dir.path().join("install")
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("oj-admin").unwrap();
        cmd.arg("--config").arg(&self.config_path);
        cmd
    }
}

/// Returns `Some(url)` when a real Postgres instance has been configured for
/// the tests that need one, `None` otherwise. Tests that need a database
/// skip themselves (rather than fail) when this is unset, since standing up
/// Postgres is outside what a plain `cargo test` run can assume.
pub fn test_database_url() -> Option<String> {
    std::env::var("JOBSVC_TEST_DATABASE_URL").ok()
}

macro_rules! require_database {
    () => {
        match crate::prelude::test_database_url() {
            Some(url) => url,
            None => {
                eprintln!("skipping: JOBSVC_TEST_DATABASE_URL not set");
                return;
            }
        }
    };
}
pub(crate) use require_database;
