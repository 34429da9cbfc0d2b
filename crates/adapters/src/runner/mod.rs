// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Runner abstraction: submits work to an external batch system and
//! answers completion queries, plus the global name-keyed registry used to
//! rehydrate a runner instance from a stored `runner_id`.

mod cluster;
mod registry;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use cluster::ClusterRunner;
pub use registry::RunnerRegistry;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRunner, SubmitCall};

use crate::error::RunnerError;
use async_trait::async_trait;
use std::path::Path;

/// The three-valued answer to "is this job done?" A `Runner` never reports
/// `Err` for a status query — a transient failure to reach the external
/// scheduler folds into `Unknown` at the adapter boundary (§7 of the design:
/// transient runner errors are swallowed, not propagated).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    Done,
    Running,
    Unknown,
}

#[async_trait]
pub trait Runner: Send + Sync {
    /// Globally unique name; becomes the prefix of every `runner_id` this
    /// runner issues.
    fn name(&self) -> &str;

    /// Submit the job directory's work and return an opaque id string.
    async fn submit(&self, job_dir: &Path) -> Result<String, RunnerError>;

    /// Query whether the job identified by `id` (the suffix of `runner_id`,
    /// without the `<name>:` prefix) has finished.
    async fn check_completed(&self, id: &str) -> CompletionStatus;
}

/// Split a stored `runner_id` of the form `"<name>:<id>"` into its parts.
pub fn split_runner_id(runner_id: &str) -> Result<(&str, &str), RunnerError> {
    runner_id
        .split_once(':')
        .ok_or_else(|| RunnerError::MalformedRunnerId(runner_id.to_string()))
}
