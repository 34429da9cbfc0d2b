// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds the single [`sqlx::PgPool`] the daemon shares behind `Arc` for its
//! whole lifetime, from `[database]` config plus the credentials file it
//! points at.

use crate::database::Database;
use crate::error::DatabaseError;
use crate::schema::Schema;
use jobsvc_core::config::DatabaseConfig;
use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;

/// `backend_config`'s contents: the credentials kept out of the main config
/// file so it can have looser file permissions than the secrets it guards.
#[derive(Debug, Deserialize)]
struct BackendCreds {
    user: String,
    passwd: String,
}

fn read_backend_creds(config: &DatabaseConfig) -> Result<BackendCreds, DatabaseError> {
    let path = config.backend_config.display().to_string();
    let text =
        std::fs::read_to_string(&config.backend_config).map_err(|source| {
            DatabaseError::BackendConfigRead { path: path.clone(), source }
        })?;
    toml::from_str(&text).map_err(|source| DatabaseError::BackendConfigParse { path, source })
}

/// `db` doubles as either a full connection URL or a bare database name; a
/// bare name is combined with `backend_config`'s `user`/`passwd` against
/// localhost, mirroring how the reference implementation's database module
/// is handed a short name in development and a full DSN in production.
fn connection_url(config: &DatabaseConfig) -> Result<String, DatabaseError> {
    if config.db.contains("://") {
        return Ok(config.db.clone());
    }
    let creds = read_backend_creds(config)?;
    Ok(format!(
        "postgres://{}:{}@localhost/{}",
        creds.user, creds.passwd, config.db
    ))
}

/// Opens the pool and wraps it in a [`Database`] under `schema`. Called once
/// at startup by the CLI's `serve`/`create-tables`/`delete-tables` commands.
pub async fn connect(config: &DatabaseConfig, schema: Schema) -> Result<Database, DatabaseError> {
    let url = connection_url(config)?;
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await?;
    Ok(Database::new(pool, schema))
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
