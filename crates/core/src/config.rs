// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed configuration loaded from a single TOML file.

use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    pub admin_email: String,
    pub service_name: String,
    pub state_file: PathBuf,
    pub socket: PathBuf,
    pub check_minutes: u64,
    /// User to grant the control socket to via `setfacl`, if the frontend
    /// runs as a different user. Unset means no ACL adjustment is made.
    #[serde(default)]
    pub socket_acl_user: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub db: String,
    pub backend_config: PathBuf,
    pub frontend_config: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoriesConfig {
    pub install: PathBuf,
    pub incoming: PathBuf,
    pub preprocessing: PathBuf,
    pub running: Option<PathBuf>,
    pub postprocessing: Option<PathBuf>,
    pub completed: Option<PathBuf>,
    pub archived: Option<PathBuf>,
    pub failed: Option<PathBuf>,
}

impl DirectoriesConfig {
    /// The directory configured for a given state, defaulting unset
    /// optional entries to `preprocessing`'s path. `Expired` has no
    /// directory: the protocol deletes the job directory on that transition.
    pub fn for_state(&self, state: crate::state::JobState) -> Option<&Path> {
        use crate::state::JobState::*;
        match state {
            Incoming => Some(&self.incoming),
            Preprocessing => Some(&self.preprocessing),
            Running => Some(self.running.as_deref().unwrap_or(&self.preprocessing)),
            Postprocessing => Some(
                self.postprocessing
                    .as_deref()
                    .unwrap_or(&self.preprocessing),
            ),
            Completed => Some(self.completed.as_deref().unwrap_or(&self.preprocessing)),
            Archived => Some(self.archived.as_deref().unwrap_or(&self.preprocessing)),
            Failed => Some(self.failed.as_deref().unwrap_or(&self.preprocessing)),
            Expired => None,
        }
    }
}

/// A parsed retention window: `NEVER` or a duration built from an
/// `h`/`d`/`m`/`y`-suffixed decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeDelta(Option<Duration>);

impl TimeDelta {
    pub const NEVER: TimeDelta = TimeDelta(None);

    pub fn as_duration(&self) -> Option<Duration> {
        self.0
    }

    /// Parse `"NEVER"` or `<decimal><h|d|m|y>` into a duration.
    ///
    /// `h` = hours, `d` = days, `m` = 30-day months, `y` = 365-day years.
    /// Any other format is rejected with [`ConfigError::InvalidTimeDelta`].
    pub fn parse(s: &str) -> Result<TimeDelta, ConfigError> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("never") {
            return Ok(TimeDelta(None));
        }
        if trimmed.len() < 2 {
            return Err(ConfigError::InvalidTimeDelta(s.to_string()));
        }
        let (value, suffix) = trimmed.split_at(trimmed.len() - 1);
        let value: f64 = value
            .parse()
            .map_err(|_| ConfigError::InvalidTimeDelta(s.to_string()))?;
        let seconds_per_unit = match suffix {
            "h" => 3600.0,
            "d" => 86400.0,
            "m" => 86400.0 * 30.0,
            "y" => 86400.0 * 365.0,
            _ => return Err(ConfigError::InvalidTimeDelta(s.to_string())),
        };
        if value < 0.0 {
            return Err(ConfigError::InvalidTimeDelta(s.to_string()));
        }
        Ok(TimeDelta(Some(Duration::from_secs_f64(
            value * seconds_per_unit,
        ))))
    }
}

impl<'de> Deserialize<'de> for TimeDelta {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        TimeDelta::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OldJobsConfig {
    pub archive: TimeDelta,
    pub expire: TimeDelta,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub submit_binary: Option<PathBuf>,
    #[serde(default)]
    pub status_binary: Option<PathBuf>,
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailerConfig {
    #[serde(default = "default_sendmail")]
    pub mailer_binary: PathBuf,
}

fn default_sendmail() -> PathBuf {
    PathBuf::from("/usr/sbin/sendmail")
}

impl Default for MailerConfig {
    fn default() -> Self {
        MailerConfig {
            mailer_binary: default_sendmail(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub general: GeneralConfig,
    pub database: DatabaseConfig,
    pub directories: DirectoriesConfig,
    pub oldjobs: OldJobsConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub mailer: MailerConfig,
}

impl Config {
    /// Load and validate a config file. Cross-field validation
    /// (`archive <= expire`) cannot be expressed through `Deserialize`
    /// alone, so it runs here rather than in a field validator.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: Config = toml::from_str(&text)?;
        if let Some(base) = path.parent() {
            config.database.backend_config = resolve_relative(base, &config.database.backend_config);
            config.database.frontend_config = config
                .database
                .frontend_config
                .map(|p| resolve_relative(base, &p));
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let archive = self.oldjobs.archive.as_duration();
        let expire = self.oldjobs.expire.as_duration();
        // NEVER (None) represents +infinity, so an unbounded archive against
        // any finite expire is also a violation, not just two finite values
        // in the wrong order.
        let violates = match (archive, expire) {
            (Some(a), Some(e)) => a > e,
            (None, Some(_)) => true,
            (_, None) => false,
        };
        if violates {
            return Err(ConfigError::ArchiveAfterExpire {
                archive: archive.map(|a| format!("{a:?}")),
                expire: expire.map(|e| format!("{e:?}")),
            });
        }
        Ok(())
    }
}

/// Resolves a config-referenced path against the directory the config file
/// itself lives in, leaving an already-absolute path untouched.
fn resolve_relative(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
