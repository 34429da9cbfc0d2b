// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj-admin show <name>` — look up and print a job row.

use std::path::Path;

use crate::context::{connect_database, load_config};
use crate::error::CliError;
use crate::output::{print_job_row, OutputFormat};

pub async fn run(config_path: &Path, name: &str, format: OutputFormat) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let database = connect_database(&config).await?;
    let row = database
        .get_job_by_name(name)
        .await?
        .ok_or_else(|| CliError::JobNotFound(name.to_string()))?;
    print_job_row(&row, format);
    Ok(())
}
