// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Core error taxonomy shared by every layer of the job lifecycle engine.

use thiserror::Error;

/// Errors raised by [`crate::state::JobState`] and the transition protocol.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid transition from {from} to {to}")]
    InvalidState { from: String, to: String },
    #[error("unknown job state: {0}")]
    UnknownState(String),
    #[error("runner error: {0}")]
    Runner(String),
    #[error("sanity check failed: {0}")]
    Sanity(String),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("hook error: {0}")]
    Hook(String),
}

/// Errors raised while loading or validating a [`crate::config::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid time delta {0:?}: expected \"NEVER\" or a number followed by h/d/m/y")]
    InvalidTimeDelta(String),
    #[error("oldjobs.archive ({archive:?}) must not be greater than oldjobs.expire ({expire:?})")]
    ArchiveAfterExpire {
        archive: Option<String>,
        expire: Option<String>,
    },
    #[error("missing required directory entry for state {0}")]
    MissingDirectory(String),
}

/// The poisoned state-file error bubbled out of `fail` when failure handling
/// itself cannot complete (database unreachable, filesystem unwritable).
#[derive(Debug, Error)]
#[error("failed while handling failure of job {job}: {source} (original failure: {original})")]
pub struct PoisonedError {
    pub job: String,
    pub original: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}
