// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Controller configuration (§6): the restore-file and history-log
//! locations, the registered resource plugins, and the timing defaults
//! used when a request doesn't override them.

use crate::env;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a state directory: set ODC_STATE_DIR, XDG_STATE_HOME, or HOME")]
    NoStateDir,
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_heartbeat_interval_ms() -> u64 {
    5_000
}

fn default_subscription_timeout_ms() -> u64 {
    30_000
}

/// Controller configuration, loadable from TOML (§6 ambient configuration
/// surface). Every field has a default so a missing config file is not an
/// error — callers fall back to [`ControllerConfig::default`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub restore_file: PathBuf,
    pub history_dir: PathBuf,
    pub plugins: HashMap<String, String>,
    pub(crate) default_timeout_ms: u64,
    pub(crate) heartbeat_interval_ms: u64,
    pub(crate) subscription_timeout_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        let state_dir = env::state_dir().unwrap_or_else(|_| PathBuf::from(".odc"));
        Self {
            restore_file: state_dir.join("restore.json"),
            history_dir: state_dir.join("history"),
            plugins: HashMap::new(),
            default_timeout_ms: default_timeout_ms(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            subscription_timeout_ms: default_subscription_timeout_ms(),
        }
    }
}

impl ControllerConfig {
    /// Load a TOML config file, falling back to defaults for any field the
    /// file doesn't set. A missing file is not an error at this layer —
    /// callers that require an explicit file should check existence first.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn subscription_timeout(&self) -> Duration {
        Duration::from_millis(self.subscription_timeout_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
