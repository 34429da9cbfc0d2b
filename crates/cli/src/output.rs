// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;
use jobsvc_core::JobRow;
use serde_json::json;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render a looked-up job row in the requested format.
pub fn print_job_row(row: &JobRow, format: OutputFormat) {
    let m = &row.metadata;
    match format {
        OutputFormat::Text => {
            println!("name:           {}", m.name);
            println!("state:          {}", row.state);
            println!("directory:      {}", m.directory.as_deref().unwrap_or("-"));
            println!("url:            {}", m.url.as_deref().unwrap_or("-"));
            println!("contact_email:  {}", m.contact_email.as_deref().unwrap_or("-"));
            println!("runner_id:      {}", m.runner_id.as_deref().unwrap_or("-"));
            println!("submit_time:    {}", format_time(m.submit_time));
            println!("preprocess_time:{}", format_time(m.preprocess_time));
            println!("run_time:       {}", format_time(m.run_time));
            println!("postprocess_time:{}", format_time(m.postprocess_time));
            println!("end_time:       {}", format_time(m.end_time));
            println!("archive_time:   {}", format_time(m.archive_time));
            println!("expire_time:    {}", format_time(m.expire_time));
            if let Some(failure) = &m.failure {
                println!("failure:        {failure}");
            }
        }
        OutputFormat::Json => {
            let value = json!({
                "name": m.name,
                "state": row.state.to_string(),
                "directory": m.directory,
                "url": m.url,
                "contact_email": m.contact_email,
                "runner_id": m.runner_id,
                "submit_time": m.submit_time,
                "preprocess_time": m.preprocess_time,
                "run_time": m.run_time,
                "postprocess_time": m.postprocess_time,
                "end_time": m.end_time,
                "archive_time": m.archive_time,
                "expire_time": m.expire_time,
                "failure": m.failure,
            });
            println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
        }
    }
}

fn format_time(t: Option<chrono::DateTime<chrono::Utc>>) -> String {
    t.map(|t| t.to_rfc3339()).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
