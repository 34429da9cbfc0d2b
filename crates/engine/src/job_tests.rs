// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::hooks::{JobContext, JobHooks, PostprocessOutcome, PreprocessOutcome};
use async_trait::async_trait;
use jobsvc_adapters::{FakeRunner, Mailer, Runner, RunnerRegistry};
use jobsvc_core::config::DirectoriesConfig;
use jobsvc_storage::DatabaseError;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

struct FakeDatabase {
    writes: Mutex<Vec<(String, JobState)>>,
}

impl FakeDatabase {
    fn new() -> Arc<Self> {
        Arc::new(FakeDatabase {
            writes: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl JobDatabase for FakeDatabase {
    async fn update_job(&self, metadata: &mut JobMetadata) -> Result<(), DatabaseError> {
        metadata.mark_synced();
        Ok(())
    }

    async fn change_job_state(
        &self,
        metadata: &mut JobMetadata,
        new_state: JobState,
    ) -> Result<(), DatabaseError> {
        self.writes.lock().push((metadata.name.clone(), new_state));
        metadata.mark_synced();
        Ok(())
    }
}

enum HookPlan {
    Run,
    SkipRun,
    Reschedule,
}

struct ScriptedHooks {
    plan: HookPlan,
    runner: Arc<FakeRunner>,
    rescheduled: Mutex<bool>,
}

impl ScriptedHooks {
    fn new(plan: HookPlan, runner: Arc<FakeRunner>) -> Arc<Self> {
        Arc::new(ScriptedHooks {
            plan,
            runner,
            rescheduled: Mutex::new(false),
        })
    }
}

#[async_trait]
impl JobHooks for ScriptedHooks {
    async fn preprocess(&self, _ctx: &JobContext<'_>) -> Result<PreprocessOutcome, HookError> {
        match self.plan {
            HookPlan::SkipRun => Ok(PreprocessOutcome::SkipRun),
            _ => Ok(PreprocessOutcome::Continue),
        }
    }

    async fn run(&self, _ctx: &JobContext<'_>) -> Result<Arc<dyn Runner>, HookError> {
        Ok(self.runner.clone() as Arc<dyn Runner>)
    }

    async fn postprocess(&self, _ctx: &JobContext<'_>) -> Result<PostprocessOutcome, HookError> {
        let mut rescheduled = self.rescheduled.lock();
        if matches!(self.plan, HookPlan::Reschedule) && !*rescheduled {
            *rescheduled = true;
            Ok(PostprocessOutcome::Reschedule(Value::from(2)))
        } else {
            Ok(PostprocessOutcome::Complete)
        }
    }
}

fn test_ctx(
    dir: &TempDir,
    database: Arc<FakeDatabase>,
    hooks: Arc<dyn JobHooks>,
    registry: Arc<RunnerRegistry>,
) -> JobEngineContext {
    let base = dir.path();
    std::fs::create_dir_all(base.join("incoming")).unwrap();
    std::fs::create_dir_all(base.join("preprocessing")).unwrap();
    std::fs::create_dir_all(base.join("running")).unwrap();
    std::fs::create_dir_all(base.join("postprocessing")).unwrap();
    std::fs::create_dir_all(base.join("completed")).unwrap();
    std::fs::create_dir_all(base.join("failed")).unwrap();
    std::fs::create_dir_all(base.join("archived")).unwrap();

    JobEngineContext {
        database,
        directories: DirectoriesConfig {
            install: base.to_path_buf(),
            incoming: base.join("incoming"),
            preprocessing: base.join("preprocessing"),
            running: Some(base.join("running")),
            postprocessing: Some(base.join("postprocessing")),
            completed: Some(base.join("completed")),
            archived: Some(base.join("archived")),
            failed: Some(base.join("failed")),
        },
        archive_delta: jobsvc_core::TimeDelta::parse("7d").unwrap(),
        expire_delta: jobsvc_core::TimeDelta::parse("30d").unwrap(),
        runners: registry,
        hooks,
        mailer: Arc::new(Mailer::new("/bin/true", "noreply@example.com")),
        admin_email: "admin@example.com".to_string(),
        service_name: "svc".to_string(),
    }
}

fn new_incoming_job<'a>(ctx: &'a JobEngineContext, name: &str) -> Job<'a> {
    let job_dir = ctx.directories.incoming.join(name);
    std::fs::create_dir_all(&job_dir).unwrap();
    let mut metadata = JobMetadata::new(name);
    metadata.set_directory(Some(job_dir.to_string_lossy().to_string()));
    metadata.mark_synced();
    Job::new(ctx, JobState::Incoming, metadata)
}

#[tokio::test]
async fn skip_run_goes_straight_to_completed_without_a_runner() {
    let dir = TempDir::new().unwrap();
    let runner = FakeRunner::new("stub");
    let hooks = ScriptedHooks::new(HookPlan::SkipRun, runner.clone());
    let registry = Arc::new(RunnerRegistry::new());
    let ctx = test_ctx(&dir, FakeDatabase::new(), hooks, registry);
    let mut job = new_incoming_job(&ctx, "j1");

    job.try_run().await.unwrap();

    assert_eq!(job.state, JobState::Completed);
    assert!(runner.submissions().is_empty());
    assert!(job.metadata.end_time.is_some());
    assert!(job.metadata.archive_time.is_some());
    assert!(job.metadata.expire_time.is_some());
}

#[tokio::test]
async fn happy_path_submits_and_completes_via_the_runner() {
    let dir = TempDir::new().unwrap();
    let runner = FakeRunner::new("stub");
    let hooks = ScriptedHooks::new(HookPlan::Run, runner.clone());
    let mut registry = RunnerRegistry::new();
    registry.register(runner.clone()).unwrap();
    let ctx = test_ctx(&dir, FakeDatabase::new(), hooks, Arc::new(registry));
    let mut job = new_incoming_job(&ctx, "j1");

    job.try_run().await.unwrap();
    assert_eq!(job.state, JobState::Running);
    assert_eq!(job.metadata.runner_id.as_deref(), Some("stub:1"));

    // Runner reports running, job-state file absent: not complete yet.
    job.try_complete().await.unwrap();
    assert_eq!(job.state, JobState::Running);

    // Both signals now agree the job is done.
    let dir_path = PathBuf::from(job.metadata.directory.clone().unwrap());
    tokio::fs::write(dir_path.join("job-state"), "DONE\n")
        .await
        .unwrap();
    runner.set_status("1", jobsvc_adapters::CompletionStatus::Done);

    job.try_complete().await.unwrap();
    assert_eq!(job.state, JobState::Completed);
    assert!(job.metadata.end_time.is_some());
}

#[tokio::test]
async fn reschedule_run_goes_back_to_running_with_a_new_runner_id() {
    let dir = TempDir::new().unwrap();
    let runner = FakeRunner::new("stub");
    let hooks = ScriptedHooks::new(HookPlan::Reschedule, runner.clone());
    let mut registry = RunnerRegistry::new();
    registry.register(runner.clone()).unwrap();
    let ctx = test_ctx(&dir, FakeDatabase::new(), hooks, Arc::new(registry));
    let mut job = new_incoming_job(&ctx, "j1");

    job.try_run().await.unwrap();
    let dir_path = PathBuf::from(job.metadata.directory.clone().unwrap());
    tokio::fs::write(dir_path.join("job-state"), "DONE\n")
        .await
        .unwrap();
    runner.set_status("1", jobsvc_adapters::CompletionStatus::Done);

    job.try_complete().await.unwrap();
    assert_eq!(job.state, JobState::Running);
    assert_eq!(job.metadata.runner_id.as_deref(), Some("stub:2"));

    // Second pass completes normally.
    let dir_path = PathBuf::from(job.metadata.directory.clone().unwrap());
    tokio::fs::write(dir_path.join("job-state"), "DONE\n")
        .await
        .unwrap();
    runner.set_status("2", jobsvc_adapters::CompletionStatus::Done);
    job.try_complete().await.unwrap();
    assert_eq!(job.state, JobState::Completed);
}

#[tokio::test]
async fn sanity_check_failure_routes_to_fail_without_touching_directory() {
    let dir = TempDir::new().unwrap();
    let runner = FakeRunner::new("stub");
    let hooks = ScriptedHooks::new(HookPlan::Run, runner.clone());
    let registry = Arc::new(RunnerRegistry::new());
    let ctx = test_ctx(&dir, FakeDatabase::new(), hooks, registry);

    let mut metadata = JobMetadata::new("missing-dir");
    metadata.set_directory(Some("/does/not/exist".to_string()));
    metadata.mark_synced();
    let mut job = Job::new(&ctx, JobState::Incoming, metadata);

    job.try_run().await.unwrap();
    assert_eq!(job.state, JobState::Failed);
    assert!(job.metadata.failure.is_some());
    assert_eq!(job.metadata.directory, None);
}

#[tokio::test]
async fn resubmit_requires_failed_state() {
    let dir = TempDir::new().unwrap();
    let runner = FakeRunner::new("stub");
    let hooks = ScriptedHooks::new(HookPlan::Run, runner);
    let registry = Arc::new(RunnerRegistry::new());
    let ctx = test_ctx(&dir, FakeDatabase::new(), hooks, registry);
    let mut job = new_incoming_job(&ctx, "j1");
    assert!(job.resubmit().await.is_err());
}

#[tokio::test]
async fn try_expire_deletes_the_job_directory() {
    let dir = TempDir::new().unwrap();
    let runner = FakeRunner::new("stub");
    let hooks = ScriptedHooks::new(HookPlan::Run, runner);
    let registry = Arc::new(RunnerRegistry::new());
    let ctx = test_ctx(&dir, FakeDatabase::new(), hooks, registry);

    let job_dir = ctx.directories.archived.clone().unwrap().join("j1");
    std::fs::create_dir_all(&job_dir).unwrap();
    let mut metadata = JobMetadata::new("j1");
    metadata.set_directory(Some(job_dir.to_string_lossy().to_string()));
    metadata.mark_synced();
    let mut job = Job::new(&ctx, JobState::Archived, metadata);

    job.try_expire().await.unwrap();
    assert_eq!(job.state, JobState::Expired);
    assert_eq!(job.metadata.directory, None);
    assert!(!job_dir.exists());
}
