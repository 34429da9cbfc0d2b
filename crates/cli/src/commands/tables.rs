// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj-admin create-tables` / `oj-admin delete-tables` — schema
//! administration, mirroring the original's standalone scaffolding script.

use std::path::Path;

use crate::context::{connect_database, load_config};
use crate::error::CliError;

pub async fn create_tables(config_path: &Path) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let database = connect_database(&config).await?;
    database.create_tables().await?;
    println!("created job tables");
    Ok(())
}

pub async fn delete_tables(config_path: &Path) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let database = connect_database(&config).await?;
    database.delete_tables().await?;
    println!("dropped job tables");
    Ok(())
}
