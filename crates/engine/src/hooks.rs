// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-state hook contract a deployed service implements.
//!
//! Expressed as a capability trait supplied once at daemon construction,
//! rather than something a `Job` subclass overrides at runtime: one
//! implementation is registered per service and handed to the engine.

use async_trait::async_trait;
use jobsvc_adapters::Runner;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::error::HookError;

/// Read-only view of the job a hook is being invoked for. The process
/// working directory is already set to `directory` for the duration of the
/// call (see [`crate::job::Job::with_job_cwd`]).
pub struct JobContext<'a> {
    pub name: &'a str,
    pub directory: &'a Path,
}

/// What `preprocess()` decided: proceed to `RUNNING`, or skip straight to
/// `COMPLETED` via `skip_run()`.
pub enum PreprocessOutcome {
    Continue,
    SkipRun,
}

/// What `postprocess()` decided: finish, or request another run via
/// `reschedule_run(data)`.
pub enum PostprocessOutcome {
    Complete,
    Reschedule(Value),
}

#[async_trait]
pub trait JobHooks: Send + Sync {
    /// Defaults to doing nothing and continuing to `RUNNING`; override and
    /// call `skip_run`'s equivalent (return `SkipRun`) to bypass the run
    /// entirely for jobs that turn out not to need one.
    async fn preprocess(&self, _ctx: &JobContext<'_>) -> Result<PreprocessOutcome, HookError> {
        Ok(PreprocessOutcome::Continue)
    }

    /// Must return the `Runner` the job's work was submitted to. The one
    /// hook every deployed service has to implement; everything else has a
    /// workable default.
    async fn run(&self, ctx: &JobContext<'_>) -> Result<Arc<dyn Runner>, HookError>;

    /// Defaults to re-invoking `run`; override to vary submission on a
    /// reschedule (e.g. a second pass with different parameters).
    async fn rerun(
        &self,
        ctx: &JobContext<'_>,
        _data: &Value,
    ) -> Result<Arc<dyn Runner>, HookError> {
        self.run(ctx).await
    }

    /// Defaults to finishing the job unconditionally; override and return
    /// `Reschedule(data)` to request another run.
    async fn postprocess(&self, _ctx: &JobContext<'_>) -> Result<PostprocessOutcome, HookError> {
        Ok(PostprocessOutcome::Complete)
    }

    async fn complete(&self, _ctx: &JobContext<'_>) -> Result<(), HookError> {
        Ok(())
    }

    async fn archive(&self, _ctx: &JobContext<'_>) -> Result<(), HookError> {
        Ok(())
    }

    async fn expire(&self, _ctx: &JobContext<'_>) -> Result<(), HookError> {
        Ok(())
    }
}

/// Reference `JobHooks`: every job is submitted to the one configured
/// `Runner`, with no preprocessing, postprocessing, or archival logic of its
/// own. Mirrors the original's base `Job` class, where only `run()` lacks a
/// workable default — the generic `oj-admin serve` binary uses this so it is
/// a complete, runnable service without a per-deployment hook library.
pub struct SingleRunnerHooks {
    runner: Arc<dyn Runner>,
}

impl SingleRunnerHooks {
    pub fn new(runner: Arc<dyn Runner>) -> Self {
        SingleRunnerHooks { runner }
    }
}

#[async_trait]
impl JobHooks for SingleRunnerHooks {
    async fn run(&self, _ctx: &JobContext<'_>) -> Result<Arc<dyn Runner>, HookError> {
        Ok(self.runner.clone())
    }
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
