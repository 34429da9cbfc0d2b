// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn add_field_rejects_duplicates() {
    let mut schema = Schema::new("jobs");
    schema.add_field("priority", "INTEGER").unwrap();
    let err = schema.add_field("priority", "TEXT").unwrap_err();
    match err {
        DatabaseError::DuplicateField(name) => assert_eq!(name, "priority"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn create_tables_sql_includes_extra_fields() {
    let mut schema = Schema::new("jobs");
    schema.add_field("priority", "INTEGER").unwrap();
    let sql = schema.create_tables_sql();
    assert!(sql.contains("CREATE TABLE IF NOT EXISTS jobs"));
    assert!(sql.contains("priority INTEGER"));
    assert!(sql.contains("job_state"));
}

#[test]
fn delete_tables_sql_uses_if_exists() {
    let schema = Schema::new("jobs");
    assert_eq!(schema.delete_tables_sql(), "DROP TABLE IF EXISTS jobs;");
}
