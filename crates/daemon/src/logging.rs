// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup grounded on the teacher's `ojd` `setup_logging()`: a
//! `tracing-appender` non-blocking writer under `install/logs`, size-triggered
//! rotation run before the subscriber is installed, and a synchronous startup
//! marker written before anything can fail inside `tracing_subscriber::init`.

use std::io::Write;
use std::path::Path;

use crate::error::DaemonError;

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
const MAX_ROTATED_LOGS: u32 = 3;
const STARTUP_MARKER_PREFIX: &str = "--- jobsvc: starting (pid: ";

/// Shift `daemon.log` → `.1` → `.2` → `.3`, dropping the oldest. Best-effort:
/// a rotation failure must not prevent the daemon from starting.
pub fn rotate_log_if_needed(log_path: &Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }
    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

/// Write a pid marker to the log before the tracing subscriber is installed,
/// so a failure in `setup_logging` itself is still diagnosable by reading
/// the raw file.
pub fn write_startup_marker(log_path: &Path) -> std::io::Result<()> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    writeln!(file, "{}{}) ---\n", STARTUP_MARKER_PREFIX, std::process::id())
}

pub fn setup_logging(
    log_path: &Path,
) -> Result<tracing_appender::non_blocking::WorkerGuard, DaemonError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file_name = log_path
        .file_name()
        .ok_or_else(|| DaemonError::Io(std::io::Error::other("log path has no file name")))?;
    let parent = log_path
        .parent()
        .ok_or_else(|| DaemonError::Io(std::io::Error::other("log path has no parent")))?;
    let file_appender = tracing_appender::rolling::never(parent, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
