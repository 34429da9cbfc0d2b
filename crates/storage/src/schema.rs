// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The extensible column list backing `CREATE TABLE` / `DROP TABLE`.

use crate::error::DatabaseError;

/// A column beyond the fixed set every job row carries, registered before
/// `create_tables` is called.
#[derive(Debug, Clone)]
pub struct ExtraField {
    pub name: String,
    pub sql_type: String,
}

/// The fixed, built-in columns, in the order they appear in `CREATE TABLE`.
/// `state` is a Postgres enum with the eight `JobState` values.
const FIXED_COLUMNS: &[&str] = &[
    "name TEXT PRIMARY KEY",
    "\"user\" TEXT",
    "passwd TEXT",
    "contact_email TEXT",
    "url TEXT",
    "directory TEXT",
    "state job_state NOT NULL DEFAULT 'INCOMING'",
    "submit_time TIMESTAMPTZ",
    "preprocess_time TIMESTAMPTZ",
    "run_time TIMESTAMPTZ",
    "postprocess_time TIMESTAMPTZ",
    "end_time TIMESTAMPTZ",
    "archive_time TIMESTAMPTZ",
    "expire_time TIMESTAMPTZ",
    "runner_id TEXT",
    "failure TEXT",
];

#[derive(Debug, Clone, Default)]
pub struct Schema {
    table: String,
    extra: Vec<ExtraField>,
}

impl Schema {
    pub fn new(table: impl Into<String>) -> Self {
        Schema {
            table: table.into(),
            extra: Vec::new(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Extend the schema before tables are created. Rejects a name already
    /// registered, fixed or extra.
    pub fn add_field(
        &mut self,
        name: impl Into<String>,
        sql_type: impl Into<String>,
    ) -> Result<(), DatabaseError> {
        let name = name.into();
        if self.extra.iter().any(|f| f.name == name) {
            return Err(DatabaseError::DuplicateField(name));
        }
        self.extra.push(ExtraField {
            name,
            sql_type: sql_type.into(),
        });
        Ok(())
    }

    pub fn extra_fields(&self) -> &[ExtraField] {
        &self.extra
    }

    /// `CREATE TYPE job_state AS ENUM (...)` followed by `CREATE TABLE`.
    pub fn create_tables_sql(&self) -> String {
        let states: Vec<String> = jobsvc_core::JobState::ALL
            .iter()
            .map(|s| format!("'{s}'"))
            .collect();
        let enum_sql = format!(
            "DO $$ BEGIN\n  CREATE TYPE job_state AS ENUM ({});\nEXCEPTION WHEN duplicate_object THEN null;\nEND $$;",
            states.join(", ")
        );
        let mut columns: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
        for field in &self.extra {
            columns.push(format!("{} {}", field.name, field.sql_type));
        }
        format!(
            "{enum_sql}\nCREATE TABLE IF NOT EXISTS {} (\n  {}\n);",
            self.table,
            columns.join(",\n  ")
        )
    }

    pub fn delete_tables_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {};", self.table)
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
