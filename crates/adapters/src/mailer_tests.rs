// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

fn write_fake_sendmail(dir: &std::path::Path, script: &str) -> PathBuf {
    let path = dir.join("fake-sendmail");
    std::fs::write(&path, script).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
    path
}

#[tokio::test]
async fn send_pipes_message_to_stdin_and_succeeds() {
    let dir = tempdir().unwrap();
    let captured = dir.path().join("captured.txt");
    let script = format!("#!/bin/sh\ncat > {}\n", captured.display());
    let binary = write_fake_sendmail(dir.path(), &script);
    let mailer = Mailer::new(binary, "noreply@example.com");
    mailer
        .send("user@example.com", "hello", "world")
        .await
        .unwrap();
    let contents = std::fs::read_to_string(&captured).unwrap();
    assert!(contents.contains("Subject: hello"));
    assert!(contents.contains("world"));
}

#[tokio::test]
async fn send_fails_when_mailer_exits_nonzero() {
    let dir = tempdir().unwrap();
    let binary = write_fake_sendmail(dir.path(), "#!/bin/sh\nexit 1\n");
    let mailer = Mailer::new(binary, "noreply@example.com");
    assert!(mailer.send("user@example.com", "s", "b").await.is_err());
}

#[tokio::test]
async fn job_failure_template_names_job_and_failure_text() {
    let dir = tempdir().unwrap();
    let captured = dir.path().join("captured.txt");
    let script = format!("#!/bin/sh\ncat > {}\n", captured.display());
    let binary = write_fake_sendmail(dir.path(), &script);
    let mailer = Mailer::new(binary, "noreply@example.com");
    mailer
        .send_job_failure("admin@example.com", "svc", "j1", "boom")
        .await
        .unwrap();
    let contents = std::fs::read_to_string(&captured).unwrap();
    assert!(contents.contains("j1 failed"));
    assert!(contents.contains("boom"));
}
