// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors from the `Database` row gateway.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),
    #[error("job not found: {0}")]
    NotFound(String),
    #[error("unknown job state column value: {0}")]
    UnknownState(#[from] jobsvc_core::EngineError),
    #[error("field {0} was already registered")]
    DuplicateField(String),
    #[error("failed to read backend config {path}: {source}")]
    BackendConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse backend config {path}: {source}")]
    BackendConfigParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
