// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `WebService`: the daemon's central loop.
//!
//! Owns the database, the engine collaborators, the control socket, and the
//! three `PeriodicAction`s that drive jobs through
//! `INCOMING -> RUNNING -> COMPLETED -> ARCHIVED -> EXPIRED`. Grounded on the
//! teacher's `ojd::main` engine loop (`tokio::select!` over signals, a
//! socket/timer source, and a fixed-resolution timer tick) generalized from
//! its single WAL-driven event source to this system's three independent
//! `PeriodicAction`s.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jobsvc_adapters::{Mailer, RunnerRegistry};
use jobsvc_core::{Config, JobState, PeriodicAction, PoisonedError};
use jobsvc_engine::{Job, JobEngineContext, JobHooks};
use jobsvc_storage::Database;
use parking_lot::Mutex;
use tokio::net::UnixListener;
use tokio::signal::unix::{signal, SignalKind};

use crate::error::DaemonError;
use crate::socket;
use crate::state_file::StateFile;

/// Everything [`WebService::start`] needs, assembled by the CLI's `serve`
/// command once config is loaded and the runner/hook implementations are
/// constructed.
pub struct WebServiceDeps {
    pub config: Config,
    pub database: Arc<Database>,
    pub runners: Arc<RunnerRegistry>,
    pub hooks: Arc<dyn JobHooks>,
    pub mailer: Arc<Mailer>,
}

pub struct WebService {
    config: Config,
    database: Arc<Database>,
    ctx: JobEngineContext,
    state_file: StateFile,
    listener: UnixListener,
    incoming: PeriodicAction,
    completed: PeriodicAction,
    old_jobs: PeriodicAction,
    poisoned: Mutex<Option<PoisonedError>>,
}

/// `floor(min(archive, expire) / 10)`, a `NEVER` side of the pair dropping
/// out of the min. Both `NEVER` falls back to the incoming/completed check
/// interval: there is nothing to sweep, but the timer still has to exist.
fn old_jobs_interval(config: &Config) -> Duration {
    let archive = config.oldjobs.archive.as_duration();
    let expire = config.oldjobs.expire.as_duration();
    let smallest = match (archive, expire) {
        (Some(a), Some(e)) => a.min(e),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => Duration::from_secs(config.general.check_minutes * 60),
    };
    (smallest / 10).max(Duration::from_secs(1))
}

impl WebService {
    /// Acquire the state-file lock, bind the control socket, sweep jobs
    /// stranded mid-hook by a prior crash, and build the three periodic
    /// actions. On any failure after the state file is acquired but before
    /// the sweep completes, the state file is left poisoned rather than
    /// silently unlocked, since a job sanity check failing here means the
    /// database or filesystem is in a state an operator needs to look at.
    pub async fn start(deps: WebServiceDeps) -> Result<WebService, DaemonError> {
        let WebServiceDeps {
            config,
            database,
            runners,
            hooks,
            mailer,
        } = deps;

        let state_file = StateFile::acquire(&config.general.state_file)?;
        let listener = socket::bind(
            &config.general.socket,
            config.general.socket_acl_user.as_deref(),
        )
        .await?;

        let ctx = JobEngineContext {
            database: database.clone(),
            directories: config.directories.clone(),
            archive_delta: config.oldjobs.archive,
            expire_delta: config.oldjobs.expire,
            runners,
            hooks,
            mailer,
            admin_email: config.general.admin_email.clone(),
            service_name: config.general.service_name.clone(),
        };

        let now = Instant::now();
        let check_interval = Duration::from_secs(config.general.check_minutes * 60);
        let old_jobs_interval = old_jobs_interval(&config);

        let mut service = WebService {
            config,
            database,
            ctx,
            state_file,
            listener,
            incoming: PeriodicAction::new(check_interval, now),
            completed: PeriodicAction::new(check_interval, now),
            old_jobs: PeriodicAction::new(old_jobs_interval, now),
            poisoned: Mutex::new(None),
        };

        if let Err(poisoned) = service.sweep_crashed_jobs().await {
            let message = poisoned.to_string();
            let _ = service.state_file.mark_poisoned(&message);
            return Err(DaemonError::Poisoned(message));
        }
        Ok(service)
    }

    /// Any job found in `PREPROCESSING` or `POSTPROCESSING` at startup is
    /// the signature of a crash mid-hook: force it to `FAILED` before the
    /// main loop starts picking up new work.
    async fn sweep_crashed_jobs(&mut self) -> Result<(), PoisonedError> {
        for state in [JobState::Preprocessing, JobState::Postprocessing] {
            let rows = match self.database.get_all_jobs_in_state(state, None, None).await {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::error!(error = %e, %state, "crash sweep query failed");
                    continue;
                }
            };
            for row in rows {
                tracing::warn!(name = row.name(), %state, "crash sweep: failing stranded job");
                let mut job = Job::new(&self.ctx, row.state, row.metadata);
                job.fail(&format!("daemon crashed while job was {state}")).await?;
            }
        }
        Ok(())
    }

    /// Run until a termination signal arrives or a job's failure handling
    /// itself fails. The state file is cleared on clean shutdown and left
    /// poisoned (with the admin emailed) otherwise.
    pub async fn run(mut self) -> Result<(), DaemonError> {
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        loop {
            let now = Instant::now();
            let wait = self
                .incoming
                .time_to_next(now)
                .min(self.completed.time_to_next(now))
                .min(self.old_jobs.time_to_next(now));

            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("received SIGTERM, shutting down");
                    break;
                }
                _ = sigint.recv() => {
                    tracing::info!("received SIGINT, shutting down");
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, _)) => {
                            socket::drain_wakeup_line(stream).await;
                            let WebService { ctx, database, poisoned, .. } = &self;
                            process_incoming_jobs(ctx, database, poisoned).await;
                            self.incoming.reset();
                        }
                        Err(e) => tracing::warn!(error = %e, "control socket accept failed"),
                    }
                }
                _ = tokio::time::sleep(wait) => {}
            }

            self.run_due_actions().await;
            if let Some(poisoned) = self.poisoned.lock().take() {
                return self.shutdown_poisoned(poisoned).await;
            }
        }

        self.shutdown_clean().await
    }

    async fn run_due_actions(&mut self) {
        let now = Instant::now();
        let WebService { ref mut incoming, ref ctx, ref database, ref poisoned, .. } = *self;
        incoming
            .try_action(now, || process_incoming_jobs(ctx, database, poisoned))
            .await;
        let WebService { ref mut completed, ref ctx, ref database, ref poisoned, .. } = *self;
        completed
            .try_action(now, || process_completed_jobs(ctx, database, poisoned))
            .await;
        let WebService { ref mut old_jobs, ref ctx, ref database, ref poisoned, .. } = *self;
        old_jobs
            .try_action(now, || process_old_jobs(ctx, database, poisoned))
            .await;
    }

    async fn shutdown_clean(self) -> Result<(), DaemonError> {
        let _ = std::fs::remove_file(&self.config.general.socket);
        self.state_file.clear()?;
        Ok(())
    }

    async fn shutdown_poisoned(self, poisoned: PoisonedError) -> Result<(), DaemonError> {
        let _ = std::fs::remove_file(&self.config.general.socket);
        let message = poisoned.to_string();
        let mut state_file = self.state_file;
        state_file.mark_poisoned(&message)?;
        let subject = format!("{} daemon poisoned", self.config.general.service_name);
        let _ = self
            .ctx
            .mailer
            .send(&self.config.general.admin_email, &subject, &message)
            .await;
        Err(DaemonError::Poisoned(message))
    }
}

/// `INCOMING -> (PREPROCESSING -> RUNNING | COMPLETED)` via `try_run`.
async fn process_incoming_jobs(
    ctx: &JobEngineContext,
    database: &Database,
    poisoned: &Mutex<Option<PoisonedError>>,
) {
    let rows = match database
        .get_all_jobs_in_state(JobState::Incoming, None, None)
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "failed to query incoming jobs");
            return;
        }
    };
    for row in rows {
        let mut job = Job::new(ctx, row.state, row.metadata);
        if let Err(e) = job.try_run().await {
            *poisoned.lock() = Some(e);
            return;
        }
    }
}

/// `RUNNING -> (POSTPROCESSING -> COMPLETED | RUNNING)` via `try_complete`.
async fn process_completed_jobs(
    ctx: &JobEngineContext,
    database: &Database,
    poisoned: &Mutex<Option<PoisonedError>>,
) {
    let rows = match database
        .get_all_jobs_in_state(JobState::Running, None, None)
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "failed to query running jobs");
            return;
        }
    };
    for row in rows {
        let mut job = Job::new(ctx, row.state, row.metadata);
        if let Err(e) = job.try_complete().await {
            *poisoned.lock() = Some(e);
            return;
        }
    }
}

/// `COMPLETED -> ARCHIVED` once `archive_time` has elapsed, and
/// `ARCHIVED -> EXPIRED` once `expire_time` has elapsed.
async fn process_old_jobs(
    ctx: &JobEngineContext,
    database: &Database,
    poisoned: &Mutex<Option<PoisonedError>>,
) {
    let due_for_archive = database
        .get_all_jobs_in_state(JobState::Completed, None, Some("archive_time"))
        .await;
    match due_for_archive {
        Ok(rows) => {
            for row in rows {
                let mut job = Job::new(ctx, row.state, row.metadata);
                if let Err(e) = job.try_archive().await {
                    *poisoned.lock() = Some(e);
                    return;
                }
            }
        }
        Err(e) => tracing::error!(error = %e, "failed to query jobs due for archive"),
    }

    let due_for_expire = database
        .get_all_jobs_in_state(JobState::Archived, None, Some("expire_time"))
        .await;
    match due_for_expire {
        Ok(rows) => {
            for row in rows {
                let mut job = Job::new(ctx, row.state, row.metadata);
                if let Err(e) = job.try_expire().await {
                    *poisoned.lock() = Some(e);
                    return;
                }
            }
        }
        Err(e) => tracing::error!(error = %e, "failed to query jobs due for expiry"),
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
