// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn entry(partition: &str, run_nr: u64) -> HistoryEntry {
    HistoryEntry {
        ts: Utc::now(),
        partition_id: PartitionId::new(partition),
        verb: "Configure".to_string(),
        aggregated_state: AggregatedState::Ready,
        run_nr,
    }
}

#[test]
fn read_all_on_unwritten_partition_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let log = SessionHistoryLog::new(dir.path());
    assert!(log.read_all(&PartitionId::new("p1")).unwrap().is_empty());
}

#[test]
fn append_then_read_all_round_trips_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let log = SessionHistoryLog::new(dir.path());
    log.append(&entry("p1", 1)).unwrap();
    log.append(&entry("p1", 2)).unwrap();

    let entries = log.read_all(&PartitionId::new("p1")).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].run_nr, 1);
    assert_eq!(entries[1].run_nr, 2);
}

#[test]
fn partitions_get_separate_files() {
    let dir = tempfile::tempdir().unwrap();
    let log = SessionHistoryLog::new(dir.path());
    log.append(&entry("p1", 1)).unwrap();
    log.append(&entry("p2", 1)).unwrap();

    assert_eq!(log.read_all(&PartitionId::new("p1")).unwrap().len(), 1);
    assert_eq!(log.read_all(&PartitionId::new("p2")).unwrap().len(), 1);
}
