// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound mail via an external MTA binary.
//!
//! The message is piped to the binary's stdin as a minimal RFC 2822
//! document; recipients are passed as argv, matching the conventional
//! `sendmail -oi <addr>...` invocation (`-oi`: don't treat a lone `.` line
//! as end-of-input, since job failure text may legitimately contain one).

use crate::error::MailError;
use crate::subprocess::MAIL_TIMEOUT;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub struct Mailer {
    binary: PathBuf,
    from: String,
}

impl Mailer {
    pub fn new(binary: impl Into<PathBuf>, from: impl Into<String>) -> Self {
        Mailer {
            binary: binary.into(),
            from: from.into(),
        }
    }

    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), MailError> {
        let message = format!(
            "From: {}\r\nTo: {to}\r\nSubject: {subject}\r\n\r\n{body}\r\n",
            self.from
        );

        let mut cmd = Command::new(&self.binary);
        cmd.arg("-oi").arg(to);
        cmd.stdin(std::process::Stdio::piped());
        cmd.stdout(std::process::Stdio::null());
        cmd.stderr(std::process::Stdio::piped());

        let mut child = cmd.spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(message.as_bytes()).await?;
        }
        let output = tokio::time::timeout(MAIL_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| MailError::Timeout(MAIL_TIMEOUT))??;
        if !output.status.success() {
            return Err(MailError::ProcessFailed(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        tracing::info!(to, subject, "sent notification email");
        Ok(())
    }

    /// Template for an admin notification of a job failure.
    pub async fn send_job_failure(
        &self,
        admin_email: &str,
        service_name: &str,
        job_name: &str,
        failure: &str,
    ) -> Result<(), MailError> {
        let subject = format!("{service_name} job {job_name} failed");
        let body = format!("Job {job_name} failed:\n\n{failure}\n");
        self.send(admin_email, &subject, &body).await
    }

    /// Template for a user notification that their job completed, sent only
    /// when `contact_email` is set on the job row.
    pub async fn send_job_completed(
        &self,
        contact_email: &str,
        service_name: &str,
        job_name: &str,
        url: Option<&str>,
    ) -> Result<(), MailError> {
        let subject = format!("{service_name} job {job_name} completed");
        let body = match url {
            Some(url) => format!("Your job {job_name} has completed. Results: {url}\n"),
            None => format!("Your job {job_name} has completed.\n"),
        };
        self.send(contact_email, &subject, &body).await
    }
}

#[cfg(test)]
#[path = "mailer_tests.rs"]
mod tests;
