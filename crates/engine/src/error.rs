// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised inside the transition protocol, and the hook contract
//! implementers fail against.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("{0}")]
    Message(String),
    #[error("runner error: {0}")]
    Runner(#[from] jobsvc_adapters::RunnerError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl HookError {
    pub fn msg(s: impl Into<String>) -> Self {
        HookError::Message(s.into())
    }
}
