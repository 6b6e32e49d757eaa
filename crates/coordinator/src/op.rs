// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The asynchronous-operation primitive (§4.4): every coordinator request
//! (`ChangeState`, `WaitForState`, `SetProperties`, `GetProperties`) fans a
//! command out to a set of runtime tasks and waits for their replies to
//! converge on one of three terminal outcomes. Completion is always
//! dispatched from whichever task observed the triggering reply or
//! task-done event, never from the loop that reads the command channel
//! itself — that loop only calls [`OperationMap::update_for_task`] /
//! [`OperationMap::update_by_id`] and moves on.

use odc_core::model::TaskId;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tokio::sync::oneshot;

/// The terminal state of an operation (§4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpOutcome<T> {
    Completed(T),
    Cancelled,
    TimedOut,
}

struct PendingOp<C, T> {
    task_ids: HashSet<TaskId>,
    context: C,
    deadline: Instant,
    reply: Option<oneshot::Sender<OpOutcome<T>>>,
}

/// A table of in-flight operations of one kind, keyed by a random `u64`
/// operation ID (§4.4 "random-u64-keyed per-type maps"). `C` is the
/// operation's private bookkeeping (e.g. the still-pending task set); `T` is
/// the value delivered to the caller on success.
pub struct OperationMap<C, T> {
    ops: Mutex<HashMap<u64, PendingOp<C, T>>>,
}

impl<C, T> Default for OperationMap<C, T> {
    fn default() -> Self {
        Self { ops: Mutex::new(HashMap::new()) }
    }
}

impl<C, T> OperationMap<C, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new operation. Sweeps already-expired entries first, so
    /// the map never grows unbounded when callers forget to poll it (§4.4
    /// "GC on next insertion").
    pub fn register(
        &self,
        op_id: u64,
        task_ids: HashSet<TaskId>,
        context: C,
        deadline: Instant,
        reply: oneshot::Sender<OpOutcome<T>>,
    ) {
        self.sweep_timeouts(Instant::now());
        self.ops.lock().insert(
            op_id,
            PendingOp { task_ids, context, deadline, reply: Some(reply) },
        );
    }

    /// Completes and removes every entry whose deadline has passed as of
    /// `now`, delivering [`OpOutcome::TimedOut`].
    pub fn sweep_timeouts(&self, now: Instant) {
        let mut ops = self.ops.lock();
        let expired: Vec<u64> =
            ops.iter().filter(|(_, op)| op.deadline <= now).map(|(id, _)| *id).collect();
        for id in expired {
            if let Some(mut op) = ops.remove(&id) {
                if let Some(tx) = op.reply.take() {
                    let _ = tx.send(OpOutcome::TimedOut);
                }
            }
        }
    }

    /// Applies `f` to every pending operation whose task set contains
    /// `task_id` (the `ChangeState`/`WaitForState`/`SetProperties` dispatch
    /// shape, which fans out to a task set and completes once every task has
    /// reported in). Completes and removes any operation for which `f`
    /// returns `Some`.
    pub fn update_for_task<F>(&self, task_id: TaskId, mut f: F)
    where
        F: FnMut(&mut C, &HashSet<TaskId>) -> Option<OpOutcome<T>>,
    {
        let mut ops = self.ops.lock();
        let mut done = Vec::new();
        for (id, op) in ops.iter_mut() {
            if !op.task_ids.contains(&task_id) {
                continue;
            }
            if let Some(outcome) = f(&mut op.context, &op.task_ids) {
                done.push((*id, outcome));
            }
        }
        for (id, outcome) in done {
            if let Some(mut op) = ops.remove(&id) {
                if let Some(tx) = op.reply.take() {
                    let _ = tx.send(outcome);
                }
            }
        }
    }

    /// Applies `f` to the operation keyed by `op_id` directly (the
    /// `GetProperties`/`PropertiesSet` reply shape, which is addressed by
    /// request ID rather than task set). Returns `false` if no such
    /// operation is pending (a late reply for an already-resolved or
    /// unrecognized request).
    pub fn update_by_id<F>(&self, op_id: u64, f: F) -> bool
    where
        F: FnOnce(&mut C) -> Option<OpOutcome<T>>,
    {
        let mut ops = self.ops.lock();
        let Some(op) = ops.get_mut(&op_id) else { return false };
        let outcome = f(&mut op.context);
        if let Some(outcome) = outcome {
            if let Some(mut op) = ops.remove(&op_id) {
                if let Some(tx) = op.reply.take() {
                    let _ = tx.send(outcome);
                }
            }
        }
        true
    }

    /// Removes an operation without sending any outcome — for callers that
    /// have already raced the reply channel against their own timeout and
    /// lost (the entry's `reply` sender is simply dropped).
    pub fn remove(&self, op_id: u64) {
        self.ops.lock().remove(&op_id);
    }

    /// Cancels every pending operation, delivering [`OpOutcome::Cancelled`]
    /// (coordinator shutdown, §4.4).
    pub fn cancel_all(&self) {
        let mut ops = self.ops.lock();
        for (_, mut op) in ops.drain() {
            if let Some(tx) = op.reply.take() {
                let _ = tx.send(OpOutcome::Cancelled);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.ops.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "op_tests.rs"]
mod tests;
