// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin typed gateway over a Postgres connection pool.
//!
//! Every query is parameterized (`$1, $2, ...`); none of it ever
//! string-concatenates a value supplied by a job row. `state` is read back
//! cast to `text` and parsed through [`jobsvc_core::JobState`]'s `FromStr`
//! rather than relying on a derived Postgres-enum mapping, since the enum's
//! value set is generated at runtime from [`crate::schema::Schema`].

use crate::error::DatabaseError;
use crate::schema::{ExtraField, Schema};
use chrono::{DateTime, Utc};
use jobsvc_core::{JobMetadata, JobRow, JobState};
use serde_json::Value;
use sqlx::{PgPool, Row};

pub struct Database {
    pool: PgPool,
    schema: Schema,
}

impl Database {
    pub fn new(pool: PgPool, schema: Schema) -> Self {
        Database { pool, schema }
    }

    pub fn schema_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }

    pub async fn create_tables(&self) -> Result<(), DatabaseError> {
        let sql = self.schema.create_tables_sql();
        tracing::info!(sql = %sql, "creating job tables");
        sqlx::raw_sql(&sql).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn delete_tables(&self) -> Result<(), DatabaseError> {
        let sql = self.schema.delete_tables_sql();
        tracing::info!(sql = %sql, "dropping job tables");
        sqlx::raw_sql(&sql).execute(&self.pool).await?;
        Ok(())
    }

    /// Jobs currently in `state`, optionally filtered by exact `name` and by
    /// `after_time_column` having elapsed (`<col> IS NOT NULL AND <col> <
    /// now()`), e.g. to find jobs whose `archive_time` has come.
    pub async fn get_all_jobs_in_state(
        &self,
        state: JobState,
        name: Option<&str>,
        after_time_column: Option<&str>,
    ) -> Result<Vec<JobRow>, DatabaseError> {
        let table = self.schema.table();
        let extra_fields = self.schema.extra_fields();
        let mut select_list = String::from(
            "name, \"user\", passwd, contact_email, url, directory, state::text AS state, \
             submit_time, preprocess_time, run_time, postprocess_time, end_time, archive_time, \
             expire_time, runner_id, failure",
        );
        for field in extra_fields {
            validate_column_name(&field.name)?;
            select_list.push_str(&format!(", {}::text AS {}", field.name, field.name));
        }
        let mut sql = format!("SELECT {select_list} FROM {table} WHERE state = $1");
        let mut bind_index = 2;
        if name.is_some() {
            sql.push_str(&format!(" AND name = ${bind_index}"));
            bind_index += 1;
        }
        if let Some(col) = after_time_column {
            validate_column_name(col)?;
            sql.push_str(&format!(" AND {col} IS NOT NULL AND {col} < now()"));
        }
        let _ = bind_index;

        let mut query = sqlx::query(&sql).bind(state.to_string());
        if let Some(n) = name {
            query = query.bind(n);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| row_to_job(row, extra_fields))
            .collect()
    }

    pub async fn get_job_by_name(&self, name: &str) -> Result<Option<JobRow>, DatabaseError> {
        let mut jobs = Vec::new();
        for state in JobState::ALL {
            let mut found = self.get_all_jobs_in_state(state, Some(name), None).await?;
            jobs.append(&mut found);
        }
        Ok(jobs.into_iter().next())
    }

    /// Write all non-state columns for `metadata`'s row in one committed
    /// UPDATE, then clear the dirty flag.
    pub async fn update_job(&self, metadata: &mut JobMetadata) -> Result<(), DatabaseError> {
        let table = self.schema.table();
        let extra_fields = self.schema.extra_fields();
        let mut sql = format!(
            "UPDATE {table} SET \"user\" = $2, passwd = $3, contact_email = $4, url = $5, \
             directory = $6, submit_time = $7, preprocess_time = $8, run_time = $9, \
             postprocess_time = $10, end_time = $11, archive_time = $12, expire_time = $13, \
             runner_id = $14, failure = $15"
        );
        let mut bind_index = 16;
        for field in extra_fields {
            validate_column_name(&field.name)?;
            sql.push_str(&format!(
                ", {} = ${bind_index}::{}",
                field.name, field.sql_type
            ));
            bind_index += 1;
        }
        sql.push_str(" WHERE name = $1");

        let mut tx = self.pool.begin().await?;
        let mut query = sqlx::query(&sql)
            .bind(&metadata.name)
            .bind(&metadata.user)
            .bind(&metadata.passwd)
            .bind(&metadata.contact_email)
            .bind(&metadata.url)
            .bind(&metadata.directory)
            .bind(metadata.submit_time)
            .bind(metadata.preprocess_time)
            .bind(metadata.run_time)
            .bind(metadata.postprocess_time)
            .bind(metadata.end_time)
            .bind(metadata.archive_time)
            .bind(metadata.expire_time)
            .bind(&metadata.runner_id)
            .bind(&metadata.failure);
        for field in extra_fields {
            query = query.bind(extra_text(metadata.extra().get(&field.name)));
        }
        query.execute(&mut *tx).await?;
        tx.commit().await?;
        metadata.mark_synced();
        Ok(())
    }

    /// Same as [`Database::update_job`] but also writes the `state` column,
    /// as used during every job transition.
    pub async fn change_job_state(
        &self,
        metadata: &mut JobMetadata,
        new_state: JobState,
    ) -> Result<(), DatabaseError> {
        let table = self.schema.table();
        let extra_fields = self.schema.extra_fields();
        let mut sql = format!(
            "UPDATE {table} SET \"user\" = $2, passwd = $3, contact_email = $4, url = $5, \
             directory = $6, state = $7, submit_time = $8, preprocess_time = $9, run_time = $10, \
             postprocess_time = $11, end_time = $12, archive_time = $13, expire_time = $14, \
             runner_id = $15, failure = $16"
        );
        let mut bind_index = 17;
        for field in extra_fields {
            validate_column_name(&field.name)?;
            sql.push_str(&format!(
                ", {} = ${bind_index}::{}",
                field.name, field.sql_type
            ));
            bind_index += 1;
        }
        sql.push_str(" WHERE name = $1");

        let mut tx = self.pool.begin().await?;
        let mut query = sqlx::query(&sql)
            .bind(&metadata.name)
            .bind(&metadata.user)
            .bind(&metadata.passwd)
            .bind(&metadata.contact_email)
            .bind(&metadata.url)
            .bind(&metadata.directory)
            .bind(new_state.to_string())
            .bind(metadata.submit_time)
            .bind(metadata.preprocess_time)
            .bind(metadata.run_time)
            .bind(metadata.postprocess_time)
            .bind(metadata.end_time)
            .bind(metadata.archive_time)
            .bind(metadata.expire_time)
            .bind(&metadata.runner_id)
            .bind(&metadata.failure);
        for field in extra_fields {
            query = query.bind(extra_text(metadata.extra().get(&field.name)));
        }
        query.execute(&mut *tx).await?;
        tx.commit().await?;
        metadata.mark_synced();
        tracing::info!(name = %metadata.name, to_state = %new_state, "job state changed");
        Ok(())
    }
}

/// Guards against SQL injection via a column name pulled from config
/// (`after_time_column`), which is not a bind parameter position.
fn validate_column_name(col: &str) -> Result<(), DatabaseError> {
    if !col.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(DatabaseError::Query(sqlx::Error::Protocol(format!(
            "invalid column name: {col}"
        ))));
    }
    Ok(())
}

/// Renders an extra field's JSON value as the text `sqlx` binds against the
/// `::{sql_type}` cast in the UPDATE statements; `None`/`Value::Null` bind as
/// SQL `NULL`.
fn extra_text(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    }
}

/// Inverse of [`extra_text`]: a column's text-cast value is re-parsed as
/// JSON where possible (recovering numbers and booleans), falling back to a
/// JSON string for anything that isn't itself valid JSON.
fn parse_extra_text(raw: Option<String>) -> Value {
    match raw {
        None => Value::Null,
        Some(s) => serde_json::from_str(&s).unwrap_or(Value::String(s)),
    }
}

fn row_to_job(row: sqlx::postgres::PgRow, extra_fields: &[ExtraField]) -> Result<JobRow, DatabaseError> {
    let state: String = row.try_get("state")?;
    let state: JobState = state.parse()?;
    let mut metadata = JobMetadata::new(row.try_get::<String, _>("name")?);
    metadata.user = row.try_get("user")?;
    metadata.passwd = row.try_get("passwd")?;
    metadata.contact_email = row.try_get("contact_email")?;
    metadata.url = row.try_get("url")?;
    metadata.directory = row.try_get("directory")?;
    metadata.submit_time = row.try_get::<Option<DateTime<Utc>>, _>("submit_time")?;
    metadata.preprocess_time = row.try_get::<Option<DateTime<Utc>>, _>("preprocess_time")?;
    metadata.run_time = row.try_get::<Option<DateTime<Utc>>, _>("run_time")?;
    metadata.postprocess_time = row.try_get::<Option<DateTime<Utc>>, _>("postprocess_time")?;
    metadata.end_time = row.try_get::<Option<DateTime<Utc>>, _>("end_time")?;
    metadata.archive_time = row.try_get::<Option<DateTime<Utc>>, _>("archive_time")?;
    metadata.expire_time = row.try_get::<Option<DateTime<Utc>>, _>("expire_time")?;
    metadata.runner_id = row.try_get("runner_id")?;
    metadata.failure = row.try_get("failure")?;
    for field in extra_fields {
        let raw: Option<String> = row.try_get(field.name.as_str())?;
        metadata.set_extra(field.name.clone(), parse_extra_text(raw));
    }
    metadata.mark_synced();
    Ok(JobRow { state, metadata })
}

#[cfg(test)]
#[path = "database_tests.rs"]
mod tests;
