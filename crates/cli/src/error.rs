// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj-admin`'s error taxonomy: one enum at this crate boundary wrapping
//! every lower-layer error type, matching this codebase's per-crate
//! thiserror-enum convention rather than a single crate-spanning error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] jobsvc_core::ConfigError),
    #[error(transparent)]
    Engine(#[from] jobsvc_core::EngineError),
    #[error(transparent)]
    Database(#[from] jobsvc_storage::DatabaseError),
    #[error(transparent)]
    Daemon(#[from] jobsvc_daemon::DaemonError),
    #[error(transparent)]
    Runner(#[from] jobsvc_adapters::RunnerError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("job {0:?} not found")]
    JobNotFound(String),
    #[error("job {name:?} is in state {state}, expected FAILED")]
    NotFailed { name: String, state: jobsvc_core::JobState },
}
