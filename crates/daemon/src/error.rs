// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("another instance is already running: {0}")]
    AlreadyRunning(String),

    #[error("state file is poisoned: {0}")]
    Poisoned(String),

    #[error("failed to bind control socket at {path}: {source}")]
    BindFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] jobsvc_core::ConfigError),

    #[error(transparent)]
    Engine(#[from] jobsvc_core::EngineError),

    #[error(transparent)]
    Database(#[from] jobsvc_storage::DatabaseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
