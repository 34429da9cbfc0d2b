// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reference `Runner` wrapping an external cluster batch scheduler via two
//! binaries: `submit` (queues a script, prints an opaque job id) and
//! `status` (given that id, prints one of a small set of state words).
//!
//! Submission writes a wrapper script into the job directory rather than
//! invoking the user's command line directly, so the directory itself
//! carries a filesystem-level completion signal (`job-state`) independent
//! of whatever the batch scheduler's own bookkeeping says — see the
//! two-signal agreement rule in the engine's `try_complete`.

use super::{CompletionStatus, Runner};
use crate::error::RunnerError;
use crate::subprocess::{run_with_timeout, STATUS_TIMEOUT, SUBMIT_TIMEOUT};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

const JOB_STATE_FILE: &str = "job-state";
const WRAPPER_SCRIPT: &str = "run-job.sh";

pub struct ClusterRunner {
    name: String,
    submit_binary: PathBuf,
    status_binary: PathBuf,
}

impl ClusterRunner {
    pub fn new(
        name: impl Into<String>,
        submit_binary: impl Into<PathBuf>,
        status_binary: impl Into<PathBuf>,
    ) -> Self {
        ClusterRunner {
            name: name.into(),
            submit_binary: submit_binary.into(),
            status_binary: status_binary.into(),
        }
    }

    fn wrapper_script_contents(command: &str) -> String {
        format!(
            "#!/bin/sh\necho STARTED > {JOB_STATE_FILE}\n{command}\necho DONE > {JOB_STATE_FILE}\n"
        )
    }
}

#[async_trait]
impl Runner for ClusterRunner {
    fn name(&self) -> &str {
        &self.name
    }

    async fn submit(&self, job_dir: &Path) -> Result<String, RunnerError> {
        let script_path = job_dir.join(WRAPPER_SCRIPT);
        let command_path = job_dir.join("cmd");
        let command = tokio::fs::read_to_string(&command_path)
            .await
            .map_err(|e| RunnerError::SubmitFailed(format!("reading {command_path:?}: {e}")))?;
        tokio::fs::write(&script_path, Self::wrapper_script_contents(command.trim()))
            .await
            .map_err(|e| RunnerError::SubmitFailed(format!("writing {script_path:?}: {e}")))?;

        let mut cmd = Command::new(&self.submit_binary);
        cmd.arg(&script_path).current_dir(job_dir);
        let output = run_with_timeout(cmd, SUBMIT_TIMEOUT, "cluster submit")
            .await
            .map_err(RunnerError::SubmitFailed)?;
        if !output.status.success() {
            return Err(RunnerError::SubmitFailed(format!(
                "submit exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if id.is_empty() {
            return Err(RunnerError::SubmitFailed(
                "submit produced no job id".to_string(),
            ));
        }
        Ok(id)
    }

    async fn check_completed(&self, id: &str) -> CompletionStatus {
        let mut cmd = Command::new(&self.status_binary);
        cmd.arg(id);
        match run_with_timeout(cmd, STATUS_TIMEOUT, "cluster status").await {
            Ok(output) if output.status.success() => {
                match String::from_utf8_lossy(&output.stdout).trim() {
                    "done" | "DONE" | "completed" => CompletionStatus::Done,
                    "running" | "RUNNING" | "queued" | "pending" => CompletionStatus::Running,
                    other => {
                        tracing::debug!(id, status = other, "unrecognized cluster status reply");
                        CompletionStatus::Unknown
                    }
                }
            }
            Ok(output) => {
                tracing::debug!(id, stderr = %String::from_utf8_lossy(&output.stderr), "status query failed non-fatally");
                CompletionStatus::Unknown
            }
            Err(message) => {
                tracing::debug!(id, error = %message, "transient status query failure");
                CompletionStatus::Unknown
            }
        }
    }
}

#[cfg(test)]
#[path = "cluster_tests.rs"]
mod tests;
