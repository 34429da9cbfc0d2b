// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared setup every subcommand needs: load config, open the database pool,
//! and assemble the engine collaborators `Job` requires even for an
//! administrative operation like `resubmit` that never touches a hook.

use std::path::PathBuf;
use std::sync::Arc;

use jobsvc_adapters::{ClusterRunner, Mailer, Runner, RunnerRegistry};
use jobsvc_core::Config;
use jobsvc_engine::{hooks::SingleRunnerHooks, JobEngineContext, JobHooks};
use jobsvc_storage::{Database, Schema};

use crate::error::CliError;

const DEFAULT_TABLE: &str = "jobs";

pub fn load_config(path: &std::path::Path) -> Result<Config, CliError> {
    Ok(Config::load(path)?)
}

pub async fn connect_database(config: &Config) -> Result<Database, CliError> {
    Ok(jobsvc_storage::connect(&config.database, Schema::new(DEFAULT_TABLE)).await?)
}

/// The one `Runner` this reference binary submits every job to, built from
/// `[runner]` config. Falls back to bare `submit`/`status` names resolved
/// against `$PATH`, matching how the original ships without a hardcoded
/// cluster-tool location.
fn build_runner(config: &Config) -> Arc<ClusterRunner> {
    let submit = config
        .runner
        .submit_binary
        .clone()
        .unwrap_or_else(|| PathBuf::from("submit"));
    let status = config
        .runner
        .status_binary
        .clone()
        .unwrap_or_else(|| PathBuf::from("status"));
    Arc::new(ClusterRunner::new("cluster", submit, status))
}

/// The registry/hooks/mailer trio every `JobEngineContext` needs, shared by
/// `serve` (which hands these straight to `WebServiceDeps`) and `resubmit`
/// (which only needs them because `Job::new` takes a full context).
pub struct Collaborators {
    pub runners: Arc<RunnerRegistry>,
    pub hooks: Arc<dyn JobHooks>,
    pub mailer: Arc<Mailer>,
}

pub fn build_collaborators(config: &Config) -> Result<Collaborators, CliError> {
    let runner: Arc<dyn Runner> = build_runner(config);
    let mut registry = RunnerRegistry::new();
    registry.register(runner.clone())?;
    let hooks: Arc<dyn JobHooks> = Arc::new(SingleRunnerHooks::new(runner));
    Ok(Collaborators {
        runners: Arc::new(registry),
        hooks,
        mailer: Arc::new(Mailer::new(
            config.mailer.mailer_binary.clone(),
            config.general.admin_email.clone(),
        )),
    })
}

/// Everything a `Job` needs. Used by `resubmit`, where hooks are never
/// actually invoked, but `Job::new` takes a full context by design (see
/// `jobsvc_engine::job::JobEngineContext`).
pub fn build_engine_context(
    config: &Config,
    database: Arc<Database>,
) -> Result<JobEngineContext, CliError> {
    let Collaborators { runners, hooks, mailer } = build_collaborators(config)?;
    Ok(JobEngineContext {
        database,
        directories: config.directories.clone(),
        archive_delta: config.oldjobs.archive,
        expire_delta: config.oldjobs.expire,
        runners,
        hooks,
        mailer,
        admin_email: config.general.admin_email.clone(),
        service_name: config.general.service_name.clone(),
    })
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
