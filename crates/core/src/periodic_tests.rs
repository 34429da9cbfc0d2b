// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn callback_does_not_run_before_interval_elapses() {
    let now = Instant::now();
    let mut action = PeriodicAction::new(Duration::from_secs(60), now);
    let mut fired = false;
    action.try_action(now, || async { fired = true }).await;
    assert!(!fired);
}

#[tokio::test]
async fn callback_runs_once_interval_elapses() {
    let start = Instant::now();
    let mut action = PeriodicAction::new(Duration::from_millis(1), start);
    tokio::time::sleep(Duration::from_millis(5)).await;
    let now = Instant::now();
    let mut fired = false;
    action.try_action(now, || async { fired = true }).await;
    assert!(fired);
}

#[test]
fn time_to_next_is_zero_once_due() {
    let start = Instant::now() - Duration::from_secs(120);
    let action = PeriodicAction::new(Duration::from_secs(60), start);
    assert_eq!(action.time_to_next(Instant::now()), Duration::ZERO);
}

#[test]
fn reset_pushes_next_deadline_out_by_a_full_interval() {
    let start = Instant::now();
    let mut action = PeriodicAction::new(Duration::from_secs(60), start);
    action.reset();
    let remaining = action.time_to_next(Instant::now());
    assert!(remaining <= Duration::from_secs(60));
    assert!(remaining > Duration::from_secs(55));
}
