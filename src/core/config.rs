//! Application configuration management
//!
//! Optional `config.toml` overriding the check-run poll policy and the
//! default checkin message. Missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{PipeupError, Result};
use crate::github::checks::PollPolicy;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Commit message used for workflow checkins
    #[serde(default = "default_commit_message")]
    pub commit_message: String,

    /// How many times to look for the CI check run before giving up
    #[serde(default = "default_resolve_attempts")]
    pub check_run_resolve_attempts: u32,

    /// Seconds between check-run resolve attempts
    #[serde(default = "default_resolve_interval_secs")]
    pub check_run_resolve_interval_secs: u64,

    /// Milliseconds between status polls while a run is active
    #[serde(default = "default_status_interval_ms")]
    pub check_run_status_interval_ms: u64,

    /// Seconds to wait before each check-runs listing
    #[serde(default = "default_discovery_lag_secs")]
    pub check_run_discovery_lag_secs: u64,
}

fn default_commit_message() -> String {
    "Setting up deployment workflow".to_string()
}

fn default_resolve_attempts() -> u32 {
    4
}

fn default_resolve_interval_secs() -> u64 {
    5
}

fn default_status_interval_ms() -> u64 {
    500
}

fn default_discovery_lag_secs() -> u64 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            commit_message: default_commit_message(),
            check_run_resolve_attempts: default_resolve_attempts(),
            check_run_resolve_interval_secs: default_resolve_interval_secs(),
            check_run_status_interval_ms: default_status_interval_ms(),
            check_run_discovery_lag_secs: default_discovery_lag_secs(),
        }
    }
}

impl Config {
    /// Load configuration from file, or fall back to defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Location of the configuration file
    fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "pipeup")
            .ok_or_else(|| PipeupError::Config("cannot determine config directory".to_string()))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Poll policy assembled from the configured intervals
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            discovery_lag: Duration::from_secs(self.check_run_discovery_lag_secs),
            resolve_attempts: self.check_run_resolve_attempts,
            resolve_interval: Duration::from_secs(self.check_run_resolve_interval_secs),
            status_interval: Duration::from_millis(self.check_run_status_interval_ms),
        }
    }
}
