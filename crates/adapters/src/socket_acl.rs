// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adjusting control-socket permissions so the frontend process (typically
//! running as a different user, e.g. a webserver) can connect to it.
//!
//! Shells out to `setfacl` rather than relying on a shared group, matching
//! the reference deployment's access-control model.

use crate::subprocess::run_with_timeout;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

const SETFACL_TIMEOUT: Duration = Duration::from_secs(5);

/// Grant `user` read-write access to the socket via a POSIX ACL entry.
/// Best-effort: failures are logged, not propagated, since a deployment
/// without ACL support (or without a frontend user to grant to) is valid.
pub async fn grant_socket_access(socket_path: &Path, user: &str) {
    let mut cmd = Command::new("setfacl");
    cmd.arg("-m")
        .arg(format!("user:{user}:rw"))
        .arg(socket_path);
    match run_with_timeout(cmd, SETFACL_TIMEOUT, "setfacl").await {
        Ok(output) if output.status.success() => {
            tracing::debug!(?socket_path, user, "granted socket ACL access");
        }
        Ok(output) => {
            tracing::warn!(
                ?socket_path,
                user,
                stderr = %String::from_utf8_lossy(&output.stderr),
                "setfacl exited non-zero"
            );
        }
        Err(message) => {
            tracing::warn!(?socket_path, user, error = %message, "setfacl invocation failed");
        }
    }
}

#[cfg(test)]
#[path = "socket_acl_tests.rs"]
mod tests;
