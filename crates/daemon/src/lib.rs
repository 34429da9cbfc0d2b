// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The long-running service process: daemonization, the control socket, the
//! state-file singleton lock, and the `WebService` main loop built on top of
//! `jobsvc_engine`'s transition protocol.

pub mod daemonize;
pub mod error;
pub mod logging;
pub mod service;
pub mod socket;
pub mod state_file;

pub use daemonize::daemonize;
pub use error::DaemonError;
pub use logging::setup_logging;
pub use service::{WebService, WebServiceDeps};
pub use state_file::StateFile;
