// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory runner for tests, recording every `submit`/`check_completed`
//! call so assertions can inspect what the engine asked of it.

use super::{CompletionStatus, Runner};
use crate::error::RunnerError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SubmitCall {
    pub job_dir: PathBuf,
}

pub struct FakeRunner {
    name: String,
    next_id: Mutex<u64>,
    submissions: Mutex<Vec<SubmitCall>>,
    statuses: Mutex<HashMap<String, CompletionStatus>>,
    fail_next_submit: Mutex<bool>,
}

impl FakeRunner {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(FakeRunner {
            name: name.into(),
            next_id: Mutex::new(1),
            submissions: Mutex::new(Vec::new()),
            statuses: Mutex::new(HashMap::new()),
            fail_next_submit: Mutex::new(false),
        })
    }

    pub fn set_status(&self, id: &str, status: CompletionStatus) {
        self.statuses.lock().insert(id.to_string(), status);
    }

    pub fn fail_next_submit(&self) {
        *self.fail_next_submit.lock() = true;
    }

    pub fn submissions(&self) -> Vec<SubmitCall> {
        self.submissions.lock().clone()
    }
}

#[async_trait]
impl Runner for FakeRunner {
    fn name(&self) -> &str {
        &self.name
    }

    async fn submit(&self, job_dir: &Path) -> Result<String, RunnerError> {
        if std::mem::take(&mut *self.fail_next_submit.lock()) {
            return Err(RunnerError::SubmitFailed("forced test failure".to_string()));
        }
        self.submissions.lock().push(SubmitCall {
            job_dir: job_dir.to_path_buf(),
        });
        let mut next_id = self.next_id.lock();
        let id = next_id.to_string();
        *next_id += 1;
        self.statuses.lock().insert(id.clone(), CompletionStatus::Running);
        Ok(id)
    }

    async fn check_completed(&self, id: &str) -> CompletionStatus {
        self.statuses
            .lock()
            .get(id)
            .copied()
            .unwrap_or(CompletionStatus::Unknown)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
