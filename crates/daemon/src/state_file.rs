// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single-line state file: daemon-singleton lock and crash marker.
//!
//! Holds an `fs2` advisory exclusive lock for as long as the daemon runs, on
//! top of the pid-liveness check, matching the teacher's daemon-singleton
//! pattern (`lifecycle::startup_inner`'s `try_lock_exclusive` on the pid
//! file) generalized to also recognize a poisoned `FAILED: ...` marker.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::error::DaemonError;

const FAILED_PREFIX: &str = "FAILED: ";

pub struct StateFile {
    path: PathBuf,
    file: File,
}

impl StateFile {
    /// Refuse to start if the file names a live pid or a poisoned run;
    /// otherwise acquire the advisory lock and write our own pid.
    pub fn acquire(path: &Path) -> Result<StateFile, DaemonError> {
        if let Ok(mut existing) = File::open(path) {
            let mut contents = String::new();
            existing.read_to_string(&mut contents)?;
            let contents = contents.trim();
            if let Some(failure) = contents.strip_prefix(FAILED_PREFIX) {
                return Err(DaemonError::Poisoned(failure.to_string()));
            }
            if let Ok(pid) = contents.parse::<i32>() {
                if process_is_alive(pid) {
                    return Err(DaemonError::AlreadyRunning(format!("pid {pid}")));
                }
            }
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        file.try_lock_exclusive()
            .map_err(|_| DaemonError::AlreadyRunning(path.display().to_string()))?;

        let mut state_file = StateFile {
            path: path.to_path_buf(),
            file,
        };
        state_file.write_pid(std::process::id())?;
        Ok(state_file)
    }

    /// Rewrite the file with a new pid, used after daemonizing since the
    /// forked child's pid differs from the parent's.
    pub fn write_pid(&mut self, pid: u32) -> std::io::Result<()> {
        self.file.set_len(0)?;
        use std::io::Seek;
        self.file.seek(std::io::SeekFrom::Start(0))?;
        writeln!(self.file, "{pid}")
    }

    /// Mark the state file poisoned so the next startup refuses to run
    /// until an operator investigates and deletes it. Intentionally left
    /// on disk (not unlinked) — that is the point of poisoning.
    pub fn mark_poisoned(&mut self, failure: &str) -> std::io::Result<()> {
        self.file.set_len(0)?;
        use std::io::Seek;
        self.file.seek(std::io::SeekFrom::Start(0))?;
        write!(self.file, "{FAILED_PREFIX}{failure}")
    }

    /// Unlink the file after a clean shutdown. The advisory lock is released
    /// when `self.file` drops regardless of whether this is called.
    pub fn clear(&self) -> std::io::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

fn process_is_alive(pid: i32) -> bool {
    // SAFETY: signal 0 sends no signal, only checks existence/permission.
    unsafe { libc::kill(pid, 0) == 0 }
}

#[cfg(test)]
#[path = "state_file_tests.rs"]
mod tests;
