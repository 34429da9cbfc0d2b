// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors from runner submission/status queries and from mail delivery.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("submit failed: {0}")]
    SubmitFailed(String),
    #[error("runner {name} reports job {runner_job_id} done but directory {directory} has no DONE marker after retries")]
    FilesystemDisagreement {
        name: String,
        runner_job_id: String,
        directory: String,
    },
    #[error("runner {0} is not registered")]
    NotFound(String),
    #[error("runner {0} is already registered under a different implementation")]
    DuplicateRegistration(String),
    #[error("malformed runner_id: {0:?}")]
    MalformedRunnerId(String),
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mailer process failed: {0}")]
    ProcessFailed(String),
    #[error("mailer timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
