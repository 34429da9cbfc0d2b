// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers shared by the runner and mailer adapters.

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Default timeout for a runner `submit` invocation.
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for a runner `status` query.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for a mailer invocation.
pub const MAIL_TIMEOUT: Duration = Duration::from_secs(10);

/// Run a subprocess command with a timeout, returning its captured output.
/// The child is killed on timeout via tokio's `Child` drop implementation.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{description} failed: {io_err}")),
        Err(_elapsed) => Err(format!(
            "{description} timed out after {}s",
            timeout.as_secs()
        )),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
