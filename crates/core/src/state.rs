// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job state machine: eight states, a fixed legal-transition table.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the eight states a job can occupy.
///
/// `PREPROCESSING` and `POSTPROCESSING` are transient: a job observed in
/// either at daemon startup is the signature of a crash and is swept to
/// `FAILED` (see the daemon's startup sanity check).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobState {
    Incoming,
    Preprocessing,
    Running,
    Postprocessing,
    Completed,
    Failed,
    Expired,
    Archived,
}

impl JobState {
    /// All states, in declaration order. Used by schema generation and tests.
    pub const ALL: [JobState; 8] = [
        JobState::Incoming,
        JobState::Preprocessing,
        JobState::Running,
        JobState::Postprocessing,
        JobState::Completed,
        JobState::Failed,
        JobState::Expired,
        JobState::Archived,
    ];

    /// True for the two states a crashed backend must never resume into.
    pub fn is_transient(self) -> bool {
        matches!(self, JobState::Preprocessing | JobState::Postprocessing)
    }

    fn is_legal_transition(from: JobState, to: JobState) -> bool {
        use JobState::*;
        if to == Failed {
            return true;
        }
        matches!(
            (from, to),
            (Incoming, Preprocessing)
                | (Preprocessing, Running)
                | (Preprocessing, Completed)
                | (Running, Postprocessing)
                | (Postprocessing, Completed)
                | (Postprocessing, Running)
                | (Completed, Archived)
                | (Archived, Expired)
                | (Failed, Incoming)
        )
    }

    /// Attempt to move from `self` to `to`, returning the new state on success.
    ///
    /// A transition succeeds when `(self, to)` is in the legal-transition
    /// table, or unconditionally when `to == Failed`.
    pub fn transition(self, to: JobState) -> Result<JobState, EngineError> {
        if Self::is_legal_transition(self, to) {
            Ok(to)
        } else {
            Err(EngineError::InvalidState {
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }

    /// Force a transition to `Failed`, bypassing the legality check.
    /// `Failed` is always a legal target, so this never fails; kept as a
    /// distinct name at call sites that intentionally bypass the table.
    pub fn force_failed(self) -> JobState {
        JobState::Failed
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Incoming => "INCOMING",
            JobState::Preprocessing => "PREPROCESSING",
            JobState::Running => "RUNNING",
            JobState::Postprocessing => "POSTPROCESSING",
            JobState::Completed => "COMPLETED",
            JobState::Failed => "FAILED",
            JobState::Expired => "EXPIRED",
            JobState::Archived => "ARCHIVED",
        };
        f.write_str(s)
    }
}

impl FromStr for JobState {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "INCOMING" => JobState::Incoming,
            "PREPROCESSING" => JobState::Preprocessing,
            "RUNNING" => JobState::Running,
            "POSTPROCESSING" => JobState::Postprocessing,
            "COMPLETED" => JobState::Completed,
            "FAILED" => JobState::Failed,
            "EXPIRED" => JobState::Expired,
            "ARCHIVED" => JobState::Archived,
            other => return Err(EngineError::UnknownState(other.to_string())),
        })
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
