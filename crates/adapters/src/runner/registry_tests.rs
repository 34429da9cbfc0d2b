// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::runner::fake::FakeRunner;

#[test]
fn register_and_get_round_trips() {
    let mut registry = RunnerRegistry::new();
    registry.register(FakeRunner::new("stub")).unwrap();
    assert_eq!(registry.get("stub").unwrap().name(), "stub");
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut registry = RunnerRegistry::new();
    registry.register(FakeRunner::new("stub")).unwrap();
    let err = registry.register(FakeRunner::new("stub")).unwrap_err();
    assert!(matches!(err, RunnerError::DuplicateRegistration(name) if name == "stub"));
}

#[test]
fn get_missing_runner_fails() {
    let registry = RunnerRegistry::new();
    assert!(registry.get("missing").is_err());
}

#[test]
fn resolve_splits_the_stored_runner_id() {
    let mut registry = RunnerRegistry::new();
    registry.register(FakeRunner::new("stub")).unwrap();
    let (runner, id) = registry.resolve("stub:42").unwrap();
    assert_eq!(runner.name(), "stub");
    assert_eq!(id, "42");
}

#[test]
fn resolve_rejects_a_malformed_runner_id() {
    let registry = RunnerRegistry::new();
    assert!(registry.resolve("no-colon-here").is_err());
}
