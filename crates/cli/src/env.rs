// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate.

use odc_controller::ConfigError;
use std::path::PathBuf;

/// Resolve state directory: `ODC_STATE_DIR` > `XDG_STATE_HOME/odc` > `~/.local/state/odc`.
pub fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("ODC_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("odc"));
    }
    let home = std::env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/odc"))
}

pub fn config_path() -> Option<PathBuf> {
    std::env::var("ODC_CONFIG").ok().map(PathBuf::from)
}

pub fn log_level() -> Option<String> {
    std::env::var("ODC_LOG").ok()
}
