// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn load_missing_file_returns_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("restore.json");
    assert!(load(&path).is_empty());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("restore.json");
    let entries = vec![
        RestoreEntry {
            partition_id: PartitionId::new("p1"),
            session_id: DeploymentSessionId::new("sess-1"),
        },
        RestoreEntry {
            partition_id: PartitionId::new("p2"),
            session_id: DeploymentSessionId::new("sess-2"),
        },
    ];
    save(&path, &entries).unwrap();
    assert_eq!(load(&path), entries);
}

#[test]
fn save_is_atomic_no_leftover_tmp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("restore.json");
    save(&path, &[]).unwrap();
    assert!(!path.with_extension("tmp").exists());
    assert!(path.exists());
}

#[test]
fn load_corrupt_file_returns_empty_and_does_not_panic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("restore.json");
    std::fs::write(&path, b"not json").unwrap();
    assert!(load(&path).is_empty());
}
