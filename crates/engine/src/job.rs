// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Job`: the per-row controller. Combines `JobState` + `JobMetadata` with
//! the directory-move / database-write / hook-invocation transition
//! protocol shared by every arc in the state machine.

use crate::db::JobDatabase;
use crate::error::HookError;
use crate::hooks::{JobContext, JobHooks, PostprocessOutcome, PreprocessOutcome};
use chrono::Utc;
use jobsvc_adapters::{CompletionStatus, Mailer, RunnerError, RunnerRegistry};
use jobsvc_core::{config::DirectoriesConfig, EngineError, JobMetadata, JobState, PoisonedError, TimeDelta};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const JOB_STATE_FILE: &str = "job-state";
const COMPLETION_RETRY_ATTEMPTS: u32 = 5;
const COMPLETION_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Shared collaborators every `Job` needs, constructed once at daemon
/// startup and lent to each job controller rather than held by value —
/// avoids the cyclic Job-holds-Database / Database-constructs-Job reference
/// the original design has, at the cost of a lifetime parameter.
pub struct JobEngineContext {
    pub database: Arc<dyn JobDatabase>,
    pub directories: DirectoriesConfig,
    pub archive_delta: TimeDelta,
    pub expire_delta: TimeDelta,
    pub runners: Arc<RunnerRegistry>,
    pub hooks: Arc<dyn JobHooks>,
    pub mailer: Arc<Mailer>,
    pub admin_email: String,
    pub service_name: String,
}

pub struct Job<'a> {
    ctx: &'a JobEngineContext,
    pub state: JobState,
    pub metadata: JobMetadata,
}

impl<'a> Job<'a> {
    pub fn new(ctx: &'a JobEngineContext, state: JobState, metadata: JobMetadata) -> Self {
        Job { ctx, state, metadata }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Run `f` with the process working directory temporarily set to the
    /// job directory, restoring the original directory on every exit path
    /// (including an error return) via the guard's `Drop` impl.
    async fn with_job_cwd<F, Fut, T>(&self, f: F) -> Result<T, HookError>
    where
        F: FnOnce(JobContext<'_>) -> Fut,
        Fut: std::future::Future<Output = Result<T, HookError>>,
    {
        let directory = self
            .metadata
            .directory
            .clone()
            .ok_or_else(|| HookError::msg("job has no directory to run its hook in"))?;
        let directory = PathBuf::from(directory);

        struct RestoreCwd(std::io::Result<PathBuf>);
        impl Drop for RestoreCwd {
            fn drop(&mut self) {
                if let Ok(original) = &self.0 {
                    let _ = std::env::set_current_dir(original);
                }
            }
        }
        let _restore = RestoreCwd(std::env::current_dir());
        std::env::set_current_dir(&directory)?;

        let ctx = JobContext {
            name: &self.metadata.name,
            directory: &directory,
        };
        f(ctx).await
    }

    /// Move the on-disk directory to the one configured for `new_state`, if
    /// different, updating `metadata.directory` accordingly. A `None`
    /// current directory (the frontend sanity-check failure case, or a job
    /// already `EXPIRED`) means there is nothing to move: it is left `None`
    /// rather than inventing a destination for a directory that does not
    /// exist on disk.
    async fn apply_directory_transition(&mut self, new_state: JobState) -> Result<(), EngineError> {
        let current = self.metadata.directory.clone();
        match self.ctx.directories.for_state(new_state) {
            None => {
                // EXPIRED: the protocol's directory operation is deletion.
                if let Some(dir) = current {
                    tokio::fs::remove_dir_all(&dir).await?;
                }
                self.metadata.set_directory(None);
            }
            Some(target_dir) => {
                let Some(current) = current else {
                    return Ok(());
                };
                let new_path = target_dir.join(&self.metadata.name);
                let new_path_str = new_path.to_string_lossy().to_string();
                if current != new_path_str {
                    tokio::fs::rename(&current, &new_path).await?;
                    self.metadata.set_directory(Some(new_path_str));
                }
            }
        }
        Ok(())
    }

    async fn sync(&mut self) -> Result<(), EngineError> {
        if self.metadata.needs_sync() {
            self.ctx
                .database
                .update_job(&mut self.metadata)
                .await
                .map_err(|e| EngineError::Sanity(e.to_string()))?;
        }
        Ok(())
    }

    async fn change_state(&mut self, new_state: JobState) -> Result<(), EngineError> {
        self.state = self.state.transition(new_state)?;
        self.apply_directory_transition(new_state).await?;
        self.ctx
            .database
            .change_job_state(&mut self.metadata, new_state)
            .await
            .map_err(|e| EngineError::Sanity(e.to_string()))?;
        Ok(())
    }

    // ---- 4.5.1 try_run -----------------------------------------------

    pub async fn try_run(&mut self) -> Result<(), PoisonedError> {
        match self.try_run_inner().await {
            Ok(()) => Ok(()),
            Err(e) => self.fail(&e.to_string()).await,
        }
    }

    async fn try_run_inner(&mut self) -> Result<(), EngineError> {
        if self.metadata.name.is_empty() {
            return Err(EngineError::Sanity("job name is empty".to_string()));
        }
        let directory_is_real = match &self.metadata.directory {
            Some(dir) => tokio::fs::metadata(dir)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false),
            None => false,
        };
        if !directory_is_real {
            // Clear first so failure handling below does not attempt to
            // move a bogus path.
            self.metadata.set_directory(None);
            return Err(EngineError::Sanity(format!(
                "job {} has no real directory",
                self.metadata.name
            )));
        }

        self.metadata.set_preprocess_time(Utc::now());
        self.change_state(JobState::Preprocessing).await?;

        if let Some(dir) = self.metadata.directory.clone() {
            let state_file = PathBuf::from(&dir).join(JOB_STATE_FILE);
            let _ = tokio::fs::remove_file(state_file).await;
        }

        let outcome = self
            .with_job_cwd(|ctx| async move { self.ctx.hooks.preprocess(&ctx).await })
            .await
            .map_err(|e| EngineError::Hook(e.to_string()))?;

        match outcome {
            PreprocessOutcome::SkipRun => {
                self.sync().await?;
                self.mark_job_completed_inner().await
            }
            PreprocessOutcome::Continue => {
                self.metadata.set_run_time(Utc::now());
                self.change_state(JobState::Running).await?;
                let runner = self
                    .with_job_cwd(|ctx| async move { self.ctx.hooks.run(&ctx).await })
                    .await
                    .map_err(|e| EngineError::Hook(e.to_string()))?;
                let directory = PathBuf::from(self.metadata.directory.clone().ok_or_else(|| {
                    EngineError::Sanity("job lost its directory before submission".to_string())
                })?);
                let submitted_id = runner
                    .submit(&directory)
                    .await
                    .map_err(|e| EngineError::Runner(e.to_string()))?;
                self.metadata
                    .set_runner_id(Some(format!("{}:{}", runner.name(), submitted_id)));
                self.sync().await
            }
        }
    }

    // ---- 4.5.2 try_complete -------------------------------------------

    pub async fn try_complete(&mut self) -> Result<(), PoisonedError> {
        match self.try_complete_inner().await {
            Ok(()) => Ok(()),
            Err(e) => self.fail(&e.to_string()).await,
        }
    }

    async fn read_job_state_file(&self) -> Result<bool, EngineError> {
        let dir = self
            .metadata
            .directory
            .clone()
            .ok_or_else(|| EngineError::Sanity("running job has no directory".to_string()))?;
        let path = PathBuf::from(dir).join(JOB_STATE_FILE);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(contents.trim_end_matches(['\r', '\n']) == "DONE"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(EngineError::Io(e)),
        }
    }

    async fn try_complete_inner(&mut self) -> Result<(), EngineError> {
        if self.state != JobState::Running {
            return Err(EngineError::Sanity(format!(
                "try_complete called on job {} in state {}, expected RUNNING",
                self.metadata.name, self.state
            )));
        }
        let runner_id = self
            .metadata
            .runner_id
            .clone()
            .ok_or_else(|| EngineError::Sanity("running job has no runner_id".to_string()))?;
        let (runner, runner_job_id) = self
            .ctx
            .runners
            .resolve(&runner_id)
            .map_err(|e| EngineError::Runner(e.to_string()))?;

        let mut state_file_done = self.read_job_state_file().await?;
        let runner_status = runner.check_completed(runner_job_id).await;

        let complete = match (state_file_done, runner_status) {
            (true, _) => true,
            (false, CompletionStatus::Running | CompletionStatus::Unknown) => false,
            (false, CompletionStatus::Done) => {
                let mut attempts = 0;
                loop {
                    if state_file_done {
                        break true;
                    }
                    if attempts >= COMPLETION_RETRY_ATTEMPTS {
                        let directory = self.metadata.directory.clone().unwrap_or_default();
                        return Err(EngineError::Runner(
                            RunnerError::FilesystemDisagreement {
                                name: runner.name().to_string(),
                                runner_job_id: runner_job_id.to_string(),
                                directory,
                            }
                            .to_string(),
                        ));
                    }
                    tokio::time::sleep(COMPLETION_RETRY_DELAY).await;
                    state_file_done = self.read_job_state_file().await?;
                    attempts += 1;
                }
            }
        };

        if !complete {
            return Ok(());
        }

        if let Some(dir) = self.metadata.directory.clone() {
            let _ = tokio::fs::remove_file(PathBuf::from(dir).join(JOB_STATE_FILE)).await;
        }
        self.metadata.set_postprocess_time(Utc::now());
        self.change_state(JobState::Postprocessing).await?;

        let outcome = self
            .with_job_cwd(|ctx| async move { self.ctx.hooks.postprocess(&ctx).await })
            .await
            .map_err(|e| EngineError::Hook(e.to_string()))?;

        match outcome {
            PostprocessOutcome::Complete => self.mark_job_completed_inner().await,
            PostprocessOutcome::Reschedule(data) => {
                self.change_state(JobState::Running).await?;
                let runner = self
                    .with_job_cwd(|ctx| {
                        let data = data.clone();
                        async move { self.ctx.hooks.rerun(&ctx, &data).await }
                    })
                    .await
                    .map_err(|e| EngineError::Hook(e.to_string()))?;
                let directory = PathBuf::from(self.metadata.directory.clone().ok_or_else(|| {
                    EngineError::Sanity("job lost its directory before resubmission".to_string())
                })?);
                let submitted_id = runner
                    .submit(&directory)
                    .await
                    .map_err(|e| EngineError::Runner(e.to_string()))?;
                self.metadata
                    .set_runner_id(Some(format!("{}:{}", runner.name(), submitted_id)));
                self.sync().await
            }
        }
    }

    // ---- 4.5.3 mark_job_completed --------------------------------------

    async fn mark_job_completed_inner(&mut self) -> Result<(), EngineError> {
        let end_time = Utc::now();
        let archive_time = self
            .ctx
            .archive_delta
            .as_duration()
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .map(|d| end_time + d);
        let expire_time = self
            .ctx
            .expire_delta
            .as_duration()
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .map(|d| end_time + d);
        self.metadata
            .set_completion_times(end_time, archive_time, expire_time);
        self.change_state(JobState::Completed).await?;

        self.with_job_cwd(|ctx| async move { self.ctx.hooks.complete(&ctx).await })
            .await
            .map_err(|e| EngineError::Hook(e.to_string()))?;
        self.sync().await?;

        if let Some(contact_email) = self.metadata.contact_email.clone() {
            self.ctx
                .mailer
                .send_job_completed(
                    &contact_email,
                    &self.ctx.service_name,
                    &self.metadata.name,
                    self.metadata.url.as_deref(),
                )
                .await
                .map_err(|e| EngineError::Hook(e.to_string()))?;
        }
        Ok(())
    }

    // ---- 4.5.4 try_archive ----------------------------------------------

    pub async fn try_archive(&mut self) -> Result<(), PoisonedError> {
        match self.try_archive_inner().await {
            Ok(()) => Ok(()),
            Err(e) => self.fail(&e.to_string()).await,
        }
    }

    async fn try_archive_inner(&mut self) -> Result<(), EngineError> {
        self.change_state(JobState::Archived).await?;
        self.with_job_cwd(|ctx| async move { self.ctx.hooks.archive(&ctx).await })
            .await
            .map_err(|e| EngineError::Hook(e.to_string()))?;
        self.sync().await
    }

    // ---- 4.5.5 try_expire -----------------------------------------------

    pub async fn try_expire(&mut self) -> Result<(), PoisonedError> {
        match self.try_expire_inner().await {
            Ok(()) => Ok(()),
            Err(e) => self.fail(&e.to_string()).await,
        }
    }

    async fn try_expire_inner(&mut self) -> Result<(), EngineError> {
        // `expire()` runs with no directory: EXPIRED has none. Hooks that
        // need files must read them before this point.
        let directory = self.metadata.directory.clone();
        self.change_state(JobState::Expired).await?;
        if let Some(directory) = directory {
            let directory = PathBuf::from(directory);
            self.ctx
                .hooks
                .expire(&JobContext {
                    name: &self.metadata.name,
                    directory: &directory,
                })
                .await
                .map_err(|e| EngineError::Hook(e.to_string()))?;
        }
        self.sync().await
    }

    // ---- 4.5.6 resubmit ---------------------------------------------------

    /// `FAILED -> INCOMING`. The caller is responsible for sending the
    /// best-effort `"INCOMING <name>"` socket wakeup after this succeeds
    /// (kept out of `Job` since it has no handle to the control socket).
    pub async fn resubmit(&mut self) -> Result<(), EngineError> {
        if self.state != JobState::Failed {
            return Err(EngineError::Sanity(format!(
                "resubmit called on job {} in state {}, expected FAILED",
                self.metadata.name, self.state
            )));
        }
        self.metadata.set_failure(None);
        self.change_state(JobState::Incoming).await
    }

    // ---- 4.5.7 fail ---------------------------------------------------

    /// Route any error escaping a transition handler here. Forces a
    /// transition to `FAILED` (always legal), records the failure text, and
    /// emails the admin. If this itself fails, the inner error is annotated
    /// with the original failure text and returned so the caller (the
    /// daemon loop) can mark the state file poisoned.
    pub async fn fail(&mut self, failure_text: &str) -> Result<(), PoisonedError> {
        self.fail_inner(failure_text).await.map_err(|source| PoisonedError {
            job: self.metadata.name.clone(),
            original: failure_text.to_string(),
            source: Box::new(source),
        })
    }

    async fn fail_inner(&mut self, failure_text: &str) -> Result<(), EngineError> {
        tracing::error!(name = %self.metadata.name, failure = failure_text, "job failed");
        self.metadata.set_failure(Some(failure_text.to_string()));
        self.state = self.state.force_failed();
        self.apply_directory_transition(JobState::Failed).await?;
        self.ctx
            .database
            .change_job_state(&mut self.metadata, JobState::Failed)
            .await
            .map_err(|e| EngineError::Sanity(e.to_string()))?;
        self.ctx
            .mailer
            .send_job_failure(
                &self.ctx.admin_email,
                &self.ctx.service_name,
                &self.metadata.name,
                failure_text,
            )
            .await
            .map_err(|e| EngineError::Hook(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
