// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end `oj-admin` lifecycle specs against a real Postgres instance:
//! `resubmit` drives a row from `FAILED` back to `INCOMING` and moves its
//! job directory back to the incoming tree, `show` renders what landed.

use crate::prelude::{require_database, Harness};

async fn insert_job(pool: &sqlx::PgPool, name: &str, directory: &str, state: &str) {
    sqlx::query(
        "INSERT INTO jobs (name, directory, state, submit_time) VALUES ($1, $2, $3::job_state, now())",
    )
    .bind(name)
    .bind(directory)
    .bind(state)
    .execute(pool)
    .await
    .unwrap();
}

#[tokio::test]
#[serial_test::serial(jobsvc_db)]
async fn resubmit_moves_a_failed_job_back_to_incoming() {
    let url = require_database!();
    let harness = Harness::new(&url);
    assert!(harness.cmd().arg("create-tables").output().unwrap().status.success());

    let pool = sqlx::postgres::PgPoolOptions::new().connect(&url).await.unwrap();

    let name = "spec-resubmit-job";
    let old_dir = harness.install_dir().join("preprocessing").join(name);
    std::fs::create_dir_all(&old_dir).unwrap();
    insert_job(&pool, name, old_dir.to_str().unwrap(), "FAILED").await;

    let resubmit = harness.cmd().args(["resubmit", name]).output().unwrap();
    assert!(
        resubmit.status.success(),
        "resubmit failed: {}",
        String::from_utf8_lossy(&resubmit.stderr)
    );

    let show = harness.cmd().args(["show", name, "-o", "json"]).output().unwrap();
    assert!(show.status.success());
    let value: serde_json::Value = serde_json::from_slice(&show.stdout).unwrap();
    assert_eq!(value["state"], "INCOMING");

    let new_dir = harness.install_dir().join("incoming").join(name);
    assert!(new_dir.is_dir(), "expected job directory moved to {new_dir:?}");
    assert!(!old_dir.exists(), "expected old directory {old_dir:?} gone");

    harness.cmd().arg("delete-tables").output().unwrap();
}

#[tokio::test]
#[serial_test::serial(jobsvc_db)]
async fn resubmitting_a_non_failed_job_is_rejected() {
    let url = require_database!();
    let harness = Harness::new(&url);
    assert!(harness.cmd().arg("create-tables").output().unwrap().status.success());

    let pool = sqlx::postgres::PgPoolOptions::new().connect(&url).await.unwrap();

    let name = "spec-not-failed-job";
    let dir = harness.install_dir().join("incoming").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    insert_job(&pool, name, dir.to_str().unwrap(), "INCOMING").await;

    let resubmit = harness.cmd().args(["resubmit", name]).output().unwrap();
    assert!(!resubmit.status.success());
    assert!(String::from_utf8_lossy(&resubmit.stderr).contains("expected FAILED"));

    harness.cmd().arg("delete-tables").output().unwrap();
}
