// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Behavioral specifications for `oj-admin`.
//!
//! Black-box: each test invokes the built binary and checks its exit code,
//! stdout, and stderr. Tests that need a running Postgres instance look for
//! `JOBSVC_TEST_DATABASE_URL` and skip themselves when it is unset.

#![allow(clippy::unwrap_used, clippy::expect_used)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/cli/errors.rs"]
mod cli_errors;
#[path = "specs/cli/help.rs"]
mod cli_help;

#[path = "specs/lifecycle.rs"]
mod lifecycle;
