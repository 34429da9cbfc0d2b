// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The UNIX-domain control socket. Any successful connection is a wakeup;
//! the payload (an advisory `"INCOMING <name>"` line) is read and logged at
//! `debug`, then discarded.

use std::path::Path;
use tokio::io::AsyncReadExt;
use tokio::net::{UnixListener, UnixStream};

use crate::error::DaemonError;

/// Unlink any stale socket and bind a fresh one, optionally granting ACL
/// access to a frontend user that runs as a different uid.
pub async fn bind(path: &Path, acl_user: Option<&str>) -> Result<UnixListener, DaemonError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    let listener = UnixListener::bind(path).map_err(|source| DaemonError::BindFailed {
        path: path.display().to_string(),
        source,
    })?;
    if let Some(user) = acl_user {
        jobsvc_adapters::socket_acl::grant_socket_access(path, user).await;
    }
    Ok(listener)
}

/// Read and discard the advisory wakeup line from an accepted connection.
pub async fn drain_wakeup_line(mut stream: UnixStream) {
    let mut buf = [0u8; 256];
    match stream.read(&mut buf).await {
        Ok(0) | Err(_) => {}
        Ok(n) => {
            let line = String::from_utf8_lossy(&buf[..n]);
            tracing::debug!(line = %line.trim(), "control socket wakeup");
        }
    }
}

/// Send the best-effort `"INCOMING <name>"` wakeup used by `resubmit`.
/// Socket errors are swallowed: a dropped wakeup just means the daemon
/// picks the job up on its next scheduled tick instead of immediately.
pub async fn send_wakeup(socket_path: &Path, name: &str) {
    use tokio::io::AsyncWriteExt;
    match UnixStream::connect(socket_path).await {
        Ok(mut stream) => {
            let _ = stream.write_all(format!("INCOMING {name}\n").as_bytes()).await;
        }
        Err(e) => {
            tracing::debug!(error = %e, "wakeup connect failed, job will pick up next tick");
        }
    }
}

#[cfg(test)]
#[path = "socket_tests.rs"]
mod tests;
