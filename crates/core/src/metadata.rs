// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dirty-tracked mirror of one job row, excluding the `state` column.
//!
//! `state` lives in [`crate::state::JobState`] instead: the two are kept as
//! siblings on [`crate::job::Job`] rather than folded into one struct, since
//! the transition protocol treats them differently (state changes go through
//! the legal-transition table; metadata changes are free-form column writes).

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;

/// The fixed, non-`state` columns of a job row.
///
/// Keys cannot be added or removed after construction; only their values can
/// change. Service-specific extra columns (registered via
/// `Database::add_field`) are carried in `extra` instead of widening this
/// struct, since they are not known at compile time.
#[derive(Debug, Clone)]
pub struct JobMetadata {
    pub name: String,
    pub user: Option<String>,
    pub passwd: Option<String>,
    pub contact_email: Option<String>,
    pub url: Option<String>,
    pub directory: Option<String>,
    pub submit_time: Option<DateTime<Utc>>,
    pub preprocess_time: Option<DateTime<Utc>>,
    pub run_time: Option<DateTime<Utc>>,
    pub postprocess_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub archive_time: Option<DateTime<Utc>>,
    pub expire_time: Option<DateTime<Utc>>,
    pub runner_id: Option<String>,
    pub failure: Option<String>,
    extra: IndexMap<String, Value>,
    needs_sync: bool,
}

impl JobMetadata {
    /// Construct a fresh, synced record. `extra` holds values for any
    /// service-specific columns registered via `add_field`.
    pub fn new(name: impl Into<String>) -> Self {
        JobMetadata {
            name: name.into(),
            user: None,
            passwd: None,
            contact_email: None,
            url: None,
            directory: None,
            submit_time: None,
            preprocess_time: None,
            run_time: None,
            postprocess_time: None,
            end_time: None,
            archive_time: None,
            expire_time: None,
            runner_id: None,
            failure: None,
            extra: IndexMap::new(),
            needs_sync: false,
        }
    }

    pub fn needs_sync(&self) -> bool {
        self.needs_sync
    }

    pub fn mark_synced(&mut self) {
        self.needs_sync = false;
    }

    pub fn set_directory(&mut self, directory: Option<String>) {
        self.directory = directory;
        self.needs_sync = true;
    }

    pub fn set_runner_id(&mut self, runner_id: Option<String>) {
        self.runner_id = runner_id;
        self.needs_sync = true;
    }

    pub fn set_failure(&mut self, failure: Option<String>) {
        self.failure = failure;
        self.needs_sync = true;
    }

    pub fn set_preprocess_time(&mut self, t: DateTime<Utc>) {
        self.preprocess_time = Some(t);
        self.needs_sync = true;
    }

    pub fn set_run_time(&mut self, t: DateTime<Utc>) {
        self.run_time = Some(t);
        self.needs_sync = true;
    }

    pub fn set_postprocess_time(&mut self, t: DateTime<Utc>) {
        self.postprocess_time = Some(t);
        self.needs_sync = true;
    }

    /// Sets `end_time`, `archive_time`, and `expire_time` together, as done
    /// exactly once upon first entry to `COMPLETED`.
    pub fn set_completion_times(
        &mut self,
        end: DateTime<Utc>,
        archive: Option<DateTime<Utc>>,
        expire: Option<DateTime<Utc>>,
    ) {
        self.end_time = Some(end);
        self.archive_time = archive;
        self.expire_time = expire;
        self.needs_sync = true;
    }

    pub fn extra(&self) -> &IndexMap<String, Value> {
        &self.extra
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: Value) {
        self.extra.insert(key.into(), value);
        self.needs_sync = true;
    }
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
