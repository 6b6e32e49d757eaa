// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The restore file (§4.1, §6): an opaque list of `{partitionID, sessionID}`
//! pairs the controller reads at startup to re-attach to deployment
//! sessions that survived a restart. Written atomically (temp file +
//! rename) so a crash mid-save never leaves a half-written file.

use odc_core::model::{DeploymentSessionId, PartitionId};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One `{partitionID, sessionID}` pair, the unit of re-attachment (§4.1
/// "invokes Initialize on each with attach semantics").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreEntry {
    pub partition_id: PartitionId,
    pub session_id: DeploymentSessionId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RestoreFileContents {
    entries: Vec<RestoreEntry>,
}

/// Save the restore list atomically: write to `path.tmp`, `fsync`, then
/// rename over `path`.
pub fn save(path: &Path, entries: &[RestoreEntry]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(
            &mut writer,
            &RestoreFileContents {
                entries: entries.to_vec(),
            },
        )?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Load the restore list. A missing or corrupt file is never fatal (§4.1
/// "failures are logged, never fatal") — this returns an empty list and
/// logs a warning rather than an error.
pub fn load(path: &Path) -> Vec<RestoreEntry> {
    if !path.exists() {
        return Vec::new();
    }
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to open restore file");
            return Vec::new();
        }
    };
    match serde_json::from_reader::<_, RestoreFileContents>(BufReader::new(file)) {
        Ok(contents) => contents.entries,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "corrupt restore file, starting with no restored partitions");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[path = "restore_tests.rs"]
mod tests;
