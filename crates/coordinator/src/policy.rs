// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `IgnoreExpendable`, the coordinator's single fault-tolerance policy
//! (§4.5), consulted whenever a task reports `Error` or exits unexpectedly
//! while not already marked `ignored`.

use crate::status::StatusTable;
use odc_core::model::{CollectionInfo, CollectionName, RuntimeCollectionId, TaskId};
use std::collections::HashMap;

/// What happened to a task that hit `Error`/unexpected `Exiting` (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyOutcome {
    /// The task's template was marked expendable; it is now `ignored` and no
    /// longer counts toward its operation's pending set.
    AbsorbedExpendable,
    /// The task belongs to a collection whose quorum still holds after this
    /// loss; the whole runtime collection is now `ignored` and its agent
    /// should be shut down.
    AbsorbedQuorum { collection_id: RuntimeCollectionId },
    /// Quorum is broken (or the task is a standalone, non-expendable task):
    /// a hard failure that must fail the enclosing operation.
    HardFailure,
    /// The task (or its whole runtime collection) was already ignored; no
    /// action needed.
    AlreadyIgnored,
}

/// Applies §4.5's `IgnoreExpendable` policy to `task_id`'s failure,
/// mutating `statuses` in place. `template_of` maps a runtime collection ID
/// to the collection template it was instantiated from, and
/// `collection_info` holds each template's quorum bookkeeping.
pub fn apply_ignore_expendable(
    statuses: &mut StatusTable,
    task_id: TaskId,
    template_of: &HashMap<RuntimeCollectionId, CollectionName>,
    collection_info: &mut HashMap<CollectionName, CollectionInfo>,
) -> PolicyOutcome {
    let Some(status) = statuses.get(task_id) else {
        return PolicyOutcome::HardFailure;
    };
    if status.ignored {
        return PolicyOutcome::AlreadyIgnored;
    }

    if status.expendable {
        if let Some(status) = statuses.get_mut(task_id) {
            status.ignored = true;
        }
        return PolicyOutcome::AbsorbedExpendable;
    }

    let collection_id = status.collection_id;
    let Some(template_name) = template_of.get(&collection_id) else {
        // Standalone task, not expendable: no quorum to fall back on.
        return PolicyOutcome::HardFailure;
    };
    let Some(info) = collection_info.get_mut(template_name) else {
        return PolicyOutcome::HardFailure;
    };

    if info.failed_runtime_collections.contains(&collection_id) {
        return PolicyOutcome::AlreadyIgnored;
    }

    info.failed_runtime_collections.insert(collection_id);
    info.n_current = info.n_current.saturating_sub(1);

    if info.quorum_holds_after_loss() {
        for status in statuses.all().iter().map(|s| s.task_id).collect::<Vec<_>>() {
            if statuses.get(status).map(|s| s.collection_id) == Some(collection_id) {
                if let Some(s) = statuses.get_mut(status) {
                    s.ignored = true;
                }
            }
        }
        PolicyOutcome::AbsorbedQuorum { collection_id }
    } else {
        PolicyOutcome::HardFailure
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
