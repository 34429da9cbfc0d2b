// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj-admin serve` — construct `Config`, `Database`, `WebService`, and run
//! the daemon loop until a termination signal arrives.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use jobsvc_daemon::{WebService, WebServiceDeps};

use crate::context::{build_collaborators, connect_database, load_config, Collaborators};
use crate::error::CliError;

fn log_path(install: &Path) -> PathBuf {
    install.join("logs").join("daemon.log")
}

/// Runs inside the already-built tokio runtime. Daemonization (if
/// requested) must have already happened in `main` before that runtime was
/// created.
pub async fn run(config_path: &Path) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let log_path = log_path(&config.directories.install);
    jobsvc_daemon::logging::rotate_log_if_needed(&log_path);
    let _ = jobsvc_daemon::logging::write_startup_marker(&log_path);
    let _guard = jobsvc_daemon::setup_logging(&log_path)?;

    let database = Arc::new(connect_database(&config).await?);
    let Collaborators { runners, hooks, mailer } = build_collaborators(&config)?;

    let service = WebService::start(WebServiceDeps {
        config,
        database,
        runners,
        hooks,
        mailer,
    })
    .await?;

    service.run().await?;
    Ok(())
}
