// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The narrow interface `Job` consumes from the storage layer.
//!
//! `Job` holds this instead of a back-pointer to the full `Database`
//! gateway, breaking the cyclic Job-holds-Database / Database-constructs-Job
//! reference the design notes call out; it also lets tests substitute an
//! in-memory fake instead of a live Postgres connection.

use async_trait::async_trait;
use jobsvc_core::{JobMetadata, JobState};
use jobsvc_storage::{Database, DatabaseError};

#[async_trait]
pub trait JobDatabase: Send + Sync {
    async fn update_job(&self, metadata: &mut JobMetadata) -> Result<(), DatabaseError>;
    async fn change_job_state(
        &self,
        metadata: &mut JobMetadata,
        new_state: JobState,
    ) -> Result<(), DatabaseError>;
}

#[async_trait]
impl JobDatabase for Database {
    async fn update_job(&self, metadata: &mut JobMetadata) -> Result<(), DatabaseError> {
        Database::update_job(self, metadata).await
    }

    async fn change_job_state(
        &self,
        metadata: &mut JobMetadata,
        new_state: JobState,
    ) -> Result<(), DatabaseError> {
        Database::change_job_state(self, metadata, new_state).await
    }
}
