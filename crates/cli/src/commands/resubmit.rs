// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj-admin resubmit <name>` — drive a `FAILED` job back to `INCOMING` and
//! send the best-effort control-socket wakeup.

use std::path::Path;
use std::sync::Arc;

use jobsvc_core::JobState;
use jobsvc_engine::Job;

use crate::context::{build_engine_context, connect_database, load_config};
use crate::error::CliError;

pub async fn run(config_path: &Path, name: &str) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let database = Arc::new(connect_database(&config).await?);

    let row = database
        .get_job_by_name(name)
        .await?
        .ok_or_else(|| CliError::JobNotFound(name.to_string()))?;
    if row.state != JobState::Failed {
        return Err(CliError::NotFailed {
            name: name.to_string(),
            state: row.state,
        });
    }

    let ctx = build_engine_context(&config, database)?;
    let mut job = Job::new(&ctx, row.state, row.metadata);
    job.resubmit().await?;

    jobsvc_daemon::socket::send_wakeup(&config.general.socket, name).await;
    println!("resubmitted {name}");
    Ok(())
}
