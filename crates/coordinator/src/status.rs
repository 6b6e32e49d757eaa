// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `DeviceStatus` array (§3, §4.4) built once at topology activation,
//! the `taskID → index` map that makes per-task updates O(1), and the path
//! aggregation rule (§4.6).

use odc_core::model::{DeviceStatus, RuntimeCollectionId, TaskId};
use odc_core::state::{AggregatedState, DeviceState};
use std::collections::HashMap;

/// One runtime task as known at activation time: its ID, the runtime
/// collection it belongs to (if any), its topology path, and whether its
/// template was marked `odc_expendable_true` (§4.2 rule 1).
#[derive(Debug, Clone)]
pub struct ActivatedTask {
    pub task_id: TaskId,
    pub collection_id: RuntimeCollectionId,
    pub path: String,
    pub expendable: bool,
}

/// Holds the `DeviceStatus` array in task-iteration order (§4.4) plus the
/// path index needed to resolve `ChangeState`/`GetProperties`/... path
/// filters to task-ID sets.
pub struct StatusTable {
    statuses: Vec<DeviceStatus>,
    index: HashMap<TaskId, usize>,
    paths: HashMap<TaskId, String>,
}

impl StatusTable {
    /// Builds the array in the order `tasks` was produced (the topology's
    /// iteration order), recording each task's path for later filtering.
    pub fn new(tasks: &[ActivatedTask]) -> Self {
        let mut statuses = Vec::with_capacity(tasks.len());
        let mut index = HashMap::with_capacity(tasks.len());
        let mut paths = HashMap::with_capacity(tasks.len());
        for (i, t) in tasks.iter().enumerate() {
            statuses.push(DeviceStatus::new(t.task_id, t.collection_id, t.expendable));
            index.insert(t.task_id, i);
            paths.insert(t.task_id, t.path.clone());
        }
        Self { statuses, index, paths }
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn get(&self, task_id: TaskId) -> Option<&DeviceStatus> {
        self.index.get(&task_id).map(|&i| &self.statuses[i])
    }

    pub fn get_mut(&mut self, task_id: TaskId) -> Option<&mut DeviceStatus> {
        let i = *self.index.get(&task_id)?;
        Some(&mut self.statuses[i])
    }

    pub fn path_of(&self, task_id: TaskId) -> Option<&str> {
        self.paths.get(&task_id).map(String::as_str)
    }

    pub fn all(&self) -> &[DeviceStatus] {
        &self.statuses
    }

    /// A task matches `path` if `path` is empty (the whole topology), is
    /// exactly the task's path, or is an ancestor group of it (§4.6).
    fn matches(task_path: &str, path: &str) -> bool {
        path.is_empty() || task_path == path || task_path.starts_with(&format!("{path}/"))
    }

    /// Resolves a path filter to the set of task IDs it covers (§4.6, §6
    /// "path filter").
    pub fn tasks_matching(&self, path: &str) -> Vec<TaskId> {
        self.paths
            .iter()
            .filter(|(_, p)| Self::matches(p, path))
            .map(|(id, _)| *id)
            .collect()
    }

    /// The `(task_id, collection_id, state, ignored)` tuple for every task
    /// matching `path`, in no particular order. Used by `GetState(detailed)`
    /// and by the failure-detail path of the state-changing verbs.
    pub fn states_matching(&self, path: &str) -> Vec<(TaskId, RuntimeCollectionId, DeviceState, bool)> {
        self.tasks_matching(path)
            .into_iter()
            .filter_map(|id| self.get(id).map(|s| (id, s.collection_id, s.state, s.ignored)))
            .collect()
    }

    /// §4.6's `aggregateStateForPath`: empty path aggregates over the whole
    /// topology; a path matching exactly one task returns that task's state;
    /// otherwise the shared state of the matching, non-ignored tasks, or
    /// `Mixed` if they disagree. Any non-ignored task in `Error` forces the
    /// whole aggregate to `Error`.
    pub fn aggregate_state_for_path(&self, path: &str) -> AggregatedState {
        let matching = self.tasks_matching(path);
        if matching.len() == 1 {
            if let Some(status) = self.get(matching[0]) {
                return status.state.into();
            }
        }

        let mut considered = matching
            .iter()
            .filter_map(|id| self.get(*id))
            .filter(|s| !s.ignored);

        let Some(first) = considered.next() else {
            return AggregatedState::Undefined;
        };

        if first.state == DeviceState::Error {
            return AggregatedState::Error;
        }

        let mut shared = first.state;
        let mut mixed = false;
        for status in considered {
            if status.state == DeviceState::Error {
                return AggregatedState::Error;
            }
            if status.state != shared {
                mixed = true;
            }
            shared = status.state;
        }

        if mixed {
            AggregatedState::Mixed
        } else {
            shared.into()
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
