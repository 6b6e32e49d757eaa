// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `TopologyCoordinator` (§4.4): owns the `DeviceStatus` array for one
//! activated topology, subscribes to the deployment layer's reply and
//! task-done channels, and serves the four device operations
//! (`ChangeState`, `WaitForState`, `SetProperties`, `GetProperties`) plus
//! the subscription heartbeat and shutdown sequences.

use crate::op::{OpOutcome, OperationMap};
use crate::policy::{apply_ignore_expendable, PolicyOutcome};
use crate::status::{ActivatedTask, StatusTable};
use odc_core::error::{ErrorCode, OdcError};
use odc_core::id::OpIdGen;
use odc_core::model::{AgentId, CollectionInfo, CollectionName, RuntimeCollectionId, TaskId};
use odc_core::state::{AggregatedState, DeviceState, Transition};
use odc_deploy::{DeploymentAdapter, DeviceCommand, DeviceReply, ReplyResult, TaskDoneEvent};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

struct ChangeCtx {
    transition: Transition,
    pending: HashSet<TaskId>,
}

struct WaitCtx {
    target_last: Option<DeviceState>,
    target_current: DeviceState,
    pending: HashSet<TaskId>,
}

struct SetPropsCtx {
    pending: HashSet<TaskId>,
    failed: HashSet<TaskId>,
}

struct GetPropsCtx {
    pending: HashSet<TaskId>,
    props: HashMap<TaskId, Vec<(String, String)>>,
    failed: HashSet<TaskId>,
}

/// Result of a converged `GetProperties` operation (§6).
#[derive(Debug, Clone, Default)]
pub struct GetPropertiesOutcome {
    pub props: HashMap<TaskId, Vec<(String, String)>>,
    pub failed: HashSet<TaskId>,
}

pub struct TopologyCoordinator<A: DeploymentAdapter> {
    deploy: Arc<A>,
    session_id: String,
    statuses: Mutex<StatusTable>,
    template_of: Mutex<HashMap<RuntimeCollectionId, CollectionName>>,
    collection_info: Mutex<HashMap<CollectionName, CollectionInfo>>,
    change_ops: OperationMap<ChangeCtx, Result<(), OdcError>>,
    wait_ops: OperationMap<WaitCtx, Result<(), OdcError>>,
    set_prop_ops: OperationMap<SetPropsCtx, HashSet<TaskId>>,
    get_prop_ops: OperationMap<GetPropsCtx, GetPropertiesOutcome>,
    op_id_gen: Arc<dyn OpIdGen>,
    heartbeat: Mutex<Option<JoinHandle<()>>>,
    replies: Mutex<Option<JoinHandle<()>>>,
    task_done: Mutex<Option<JoinHandle<()>>>,
}

impl<A: DeploymentAdapter> TopologyCoordinator<A> {
    pub fn new(
        deploy: Arc<A>,
        session_id: impl Into<String>,
        tasks: Vec<ActivatedTask>,
        template_of: HashMap<RuntimeCollectionId, CollectionName>,
        collection_info: HashMap<CollectionName, CollectionInfo>,
        op_id_gen: Arc<dyn OpIdGen>,
    ) -> Arc<Self> {
        Arc::new(Self {
            deploy,
            session_id: session_id.into(),
            statuses: Mutex::new(StatusTable::new(&tasks)),
            template_of: Mutex::new(template_of),
            collection_info: Mutex::new(collection_info),
            change_ops: OperationMap::new(),
            wait_ops: OperationMap::new(),
            set_prop_ops: OperationMap::new(),
            get_prop_ops: OperationMap::new(),
            op_id_gen,
            heartbeat: Mutex::new(None),
            replies: Mutex::new(None),
            task_done: Mutex::new(None),
        })
    }

    pub fn task_count(&self) -> usize {
        self.statuses.lock().len()
    }

    pub fn aggregate_state(&self, path: &str) -> AggregatedState {
        self.statuses.lock().aggregate_state_for_path(path)
    }

    pub fn subscribed_count(&self) -> usize {
        self.statuses.lock().all().iter().filter(|s| s.subscribed_to_state_changes).count()
    }

    /// `(task_id, collection_id, state, ignored)` for every task matching
    /// `path`, for `GetState(detailed)` and failure-detail reporting (§6).
    pub fn task_states(&self, path: &str) -> Vec<(TaskId, RuntimeCollectionId, DeviceState, bool)> {
        self.statuses.lock().states_matching(path)
    }

    /// Subscribes to the deployment layer's channels, broadcasts the
    /// initial `SubscribeToStateChange`, and starts the heartbeat loop.
    pub async fn start(self: &Arc<Self>, heartbeat_interval: Duration) -> Result<(), OdcError> {
        let replies = self
            .deploy
            .subscribe_replies(&self.session_id)
            .await
            .map_err(|e| OdcError::new(ErrorCode::DdsSubscribeToSessionFailed, e.to_string()))?;
        let done = self
            .deploy
            .subscribe_task_done(&self.session_id)
            .await
            .map_err(|e| OdcError::new(ErrorCode::DdsSubscribeToSessionFailed, e.to_string()))?;

        *self.replies.lock() = Some(tokio::spawn(Arc::clone(self).run_reply_loop(replies)));
        *self.task_done.lock() = Some(tokio::spawn(Arc::clone(self).run_task_done_loop(done)));

        self.deploy
            .send_command(
                &self.session_id,
                &DeviceCommand::SubscribeToStateChange { interval_ms: heartbeat_interval.as_millis() as u64 },
                None,
            )
            .await
            .map_err(|e| OdcError::new(ErrorCode::FairMqChangeStateFailed, e.to_string()))?;

        *self.heartbeat.lock() = Some(tokio::spawn(Arc::clone(self).run_heartbeat_loop(heartbeat_interval)));
        Ok(())
    }

    /// Bounded wait (§4.4, default 30s) for every task to confirm its
    /// subscription before the caller issues the first `ChangeState`.
    pub async fn wait_for_subscriptions(&self, timeout: Duration) -> bool {
        let expected = self.task_count();
        let deadline = Instant::now() + timeout;
        loop {
            if self.subscribed_count() >= expected {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Cancels the heartbeat, unsubscribes, waits (bounded) for the
    /// subscriber count to drain, then cancels every outstanding operation.
    pub async fn shutdown(&self, drain_timeout: Duration) {
        if let Some(h) = self.heartbeat.lock().take() {
            h.abort();
        }
        let _ = self
            .deploy
            .send_command(&self.session_id, &DeviceCommand::UnsubscribeFromStateChange, None)
            .await;

        let deadline = Instant::now() + drain_timeout;
        while self.subscribed_count() > 0 && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        if let Some(h) = self.replies.lock().take() {
            h.abort();
        }
        if let Some(h) = self.task_done.lock().take() {
            h.abort();
        }

        self.change_ops.cancel_all();
        self.wait_ops.cancel_all();
        self.set_prop_ops.cancel_all();
        self.get_prop_ops.cancel_all();
    }

    /// §4.4 `ChangeState`: broadcasts `transition` to every non-ignored task
    /// matching `path` and waits for all of them to converge on the
    /// transition's expected post-state.
    pub async fn change_state(
        &self,
        path: &str,
        transition: Transition,
        timeout: Duration,
    ) -> Result<AggregatedState, OdcError> {
        let targets = self.non_ignored_matching(path);
        if targets.is_empty() {
            return Ok(self.aggregate_state(path));
        }

        let op_id = self.op_id_gen.next_op_id();
        let (tx, rx) = oneshot::channel();
        let pending: HashSet<TaskId> = targets.iter().copied().collect();
        self.change_ops.register(
            op_id,
            pending.clone(),
            ChangeCtx { transition, pending },
            Instant::now() + timeout,
            tx,
        );

        let filter = (!path.is_empty()).then_some(path);
        if let Err(e) = self.deploy.send_command(&self.session_id, &DeviceCommand::ChangeState(transition), filter).await {
            self.change_ops.remove(op_id);
            return Err(OdcError::new(ErrorCode::FairMqChangeStateFailed, e.to_string()));
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(OpOutcome::Completed(Ok(())))) => Ok(self.aggregate_state(path)),
            Ok(Ok(OpOutcome::Completed(Err(e)))) => Err(e),
            Ok(Ok(OpOutcome::Cancelled)) => {
                Err(OdcError::new(ErrorCode::OperationCanceled, "change state canceled"))
            }
            Ok(Ok(OpOutcome::TimedOut)) | Err(_) => {
                self.change_ops.remove(op_id);
                Err(OdcError::new(
                    ErrorCode::OperationTimeout,
                    format!("{transition} timed out waiting for {} task(s)", targets.len()),
                ))
            }
            Ok(Err(_)) => Err(OdcError::new(ErrorCode::OperationCanceled, "operation channel dropped")),
        }
    }

    /// §4.4 `WaitForState`: waits (without issuing a command) for every
    /// non-ignored task matching `path` to reach `(target_last, target_current)`.
    /// `target_last = None` matches any last state.
    pub async fn wait_for_state(
        &self,
        path: &str,
        target_last: Option<DeviceState>,
        target_current: DeviceState,
        timeout: Duration,
    ) -> Result<(), OdcError> {
        let targets = self.non_ignored_matching(path);
        let pending: HashSet<TaskId> = {
            let statuses = self.statuses.lock();
            targets
                .into_iter()
                .filter(|id| {
                    statuses
                        .get(*id)
                        .map(|s| !(target_last.map(|t| t == s.last_state).unwrap_or(true) && s.state == target_current))
                        .unwrap_or(false)
                })
                .collect()
        };
        if pending.is_empty() {
            return Ok(());
        }

        let op_id = self.op_id_gen.next_op_id();
        let (tx, rx) = oneshot::channel();
        self.wait_ops.register(
            op_id,
            pending.clone(),
            WaitCtx { target_last, target_current, pending },
            Instant::now() + timeout,
            tx,
        );

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(OpOutcome::Completed(Ok(())))) => Ok(()),
            Ok(Ok(OpOutcome::Completed(Err(e)))) => Err(e),
            Ok(Ok(OpOutcome::Cancelled)) => Err(OdcError::new(ErrorCode::OperationCanceled, "wait canceled")),
            Ok(Ok(OpOutcome::TimedOut)) | Err(_) => {
                self.wait_ops.remove(op_id);
                Err(OdcError::new(ErrorCode::OperationTimeout, "wait for state timed out"))
            }
            Ok(Err(_)) => Err(OdcError::new(ErrorCode::OperationCanceled, "operation channel dropped")),
        }
    }

    /// §4.4 `SetProperties`: broadcasts the property set under a fresh
    /// request ID and aggregates the devices that reported failure.
    pub async fn set_properties(
        &self,
        path: &str,
        props: Vec<(String, String)>,
        timeout: Duration,
    ) -> Result<(), OdcError> {
        let targets = self.non_ignored_matching(path);
        if targets.is_empty() {
            return Ok(());
        }

        let op_id = self.op_id_gen.next_op_id();
        let (tx, rx) = oneshot::channel();
        let pending: HashSet<TaskId> = targets.iter().copied().collect();
        self.set_prop_ops.register(
            op_id,
            pending.clone(),
            SetPropsCtx { pending, failed: HashSet::new() },
            Instant::now() + timeout,
            tx,
        );

        let filter = (!path.is_empty()).then_some(path);
        let cmd = DeviceCommand::SetProperties { request_id: op_id, props };
        if let Err(e) = self.deploy.send_command(&self.session_id, &cmd, filter).await {
            self.set_prop_ops.remove(op_id);
            return Err(OdcError::new(ErrorCode::FairMqSetPropertiesFailed, e.to_string()));
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(OpOutcome::Completed(failed))) if failed.is_empty() => Ok(()),
            Ok(Ok(OpOutcome::Completed(failed))) => Err(OdcError::new(
                ErrorCode::FairMqSetPropertiesFailed,
                format!("{} device(s) failed to set properties", failed.len()),
            )),
            Ok(Ok(OpOutcome::Cancelled)) => {
                Err(OdcError::new(ErrorCode::OperationCanceled, "set properties canceled"))
            }
            Ok(Ok(OpOutcome::TimedOut)) | Err(_) => {
                self.set_prop_ops.remove(op_id);
                Err(OdcError::new(ErrorCode::OperationTimeout, "set properties timed out"))
            }
            Ok(Err(_)) => Err(OdcError::new(ErrorCode::OperationCanceled, "operation channel dropped")),
        }
    }

    /// §4.4 `GetProperties`: broadcasts the query under a fresh request ID
    /// and aggregates `{ok devices → props}` plus the set of devices that
    /// failed to answer.
    pub async fn get_properties(
        &self,
        path: &str,
        query: &str,
        timeout: Duration,
    ) -> Result<GetPropertiesOutcome, OdcError> {
        let targets = self.non_ignored_matching(path);
        if targets.is_empty() {
            return Ok(GetPropertiesOutcome::default());
        }

        let op_id = self.op_id_gen.next_op_id();
        let (tx, rx) = oneshot::channel();
        let pending: HashSet<TaskId> = targets.iter().copied().collect();
        self.get_prop_ops.register(
            op_id,
            pending.clone(),
            GetPropsCtx { pending, props: HashMap::new(), failed: HashSet::new() },
            Instant::now() + timeout,
            tx,
        );

        let filter = (!path.is_empty()).then_some(path);
        let cmd = DeviceCommand::GetProperties { request_id: op_id, regex: query.to_string() };
        if let Err(e) = self.deploy.send_command(&self.session_id, &cmd, filter).await {
            self.get_prop_ops.remove(op_id);
            return Err(OdcError::new(ErrorCode::FairMqGetStateFailed, e.to_string()));
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(OpOutcome::Completed(outcome))) => Ok(outcome),
            Ok(Ok(OpOutcome::Cancelled)) => {
                Err(OdcError::new(ErrorCode::OperationCanceled, "get properties canceled"))
            }
            Ok(Ok(OpOutcome::TimedOut)) | Err(_) => {
                self.get_prop_ops.remove(op_id);
                Err(OdcError::new(ErrorCode::OperationTimeout, "get properties timed out"))
            }
            Ok(Err(_)) => Err(OdcError::new(ErrorCode::OperationCanceled, "operation channel dropped")),
        }
    }

    fn non_ignored_matching(&self, path: &str) -> Vec<TaskId> {
        let statuses = self.statuses.lock();
        statuses
            .tasks_matching(path)
            .into_iter()
            .filter(|id| !statuses.get(*id).map(|s| s.ignored).unwrap_or(true))
            .collect()
    }

    async fn run_heartbeat_loop(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let _ = self
                .deploy
                .send_command(
                    &self.session_id,
                    &DeviceCommand::SubscriptionHeartbeat { interval_ms: interval.as_millis() as u64 },
                    None,
                )
                .await;
            let now = Instant::now();
            self.change_ops.sweep_timeouts(now);
            self.wait_ops.sweep_timeouts(now);
            self.set_prop_ops.sweep_timeouts(now);
            self.get_prop_ops.sweep_timeouts(now);
        }
    }

    async fn run_reply_loop(self: Arc<Self>, mut rx: mpsc::Receiver<DeviceReply>) {
        while let Some(reply) = rx.recv().await {
            match reply {
                DeviceReply::StateChangeSubscription { task_id, result } => {
                    if result == ReplyResult::Success {
                        if let Some(s) = self.statuses.lock().get_mut(task_id) {
                            s.subscribed_to_state_changes = true;
                        }
                    }
                }
                DeviceReply::StateChangeUnsubscription { task_id, .. } => {
                    if let Some(s) = self.statuses.lock().get_mut(task_id) {
                        s.subscribed_to_state_changes = false;
                    }
                }
                DeviceReply::StateChange { task_id, last_state, current_state } => {
                    self.handle_state_change(task_id, last_state, current_state);
                }
                DeviceReply::TransitionStatus { task_id, result, transition, current_state } => {
                    self.handle_transition_status(task_id, result, transition, current_state);
                }
                DeviceReply::Properties { task_id, request_id, result, props } => {
                    self.get_prop_ops.update_by_id(request_id, |ctx| {
                        ctx.pending.remove(&task_id);
                        match result {
                            ReplyResult::Success => {
                                ctx.props.insert(task_id, props);
                            }
                            ReplyResult::Failure => {
                                ctx.failed.insert(task_id);
                            }
                        }
                        ctx.pending.is_empty().then(|| {
                            OpOutcome::Completed(GetPropertiesOutcome {
                                props: ctx.props.clone(),
                                failed: ctx.failed.clone(),
                            })
                        })
                    });
                }
                DeviceReply::PropertiesSet { task_id, request_id, result } => {
                    self.set_prop_ops.update_by_id(request_id, |ctx| {
                        ctx.pending.remove(&task_id);
                        if result == ReplyResult::Failure {
                            ctx.failed.insert(task_id);
                        }
                        ctx.pending.is_empty().then(|| OpOutcome::Completed(ctx.failed.clone()))
                    });
                }
            }
        }
    }

    async fn run_task_done_loop(self: Arc<Self>, mut rx: mpsc::Receiver<TaskDoneEvent>) {
        while let Some(event) = rx.recv().await {
            let already_ignored = {
                let mut statuses = self.statuses.lock();
                let ignored = statuses.get(event.task_id).map(|s| s.ignored).unwrap_or(true);
                if let Some(s) = statuses.get_mut(event.task_id) {
                    s.exit_code = event.exit_code;
                    s.signal = event.signal;
                    s.subscribed_to_state_changes = false;
                }
                ignored
            };
            if !already_ignored {
                self.handle_task_lost(event.task_id);
            }
        }
    }

    fn handle_state_change(&self, task_id: TaskId, last_state: DeviceState, current_state: DeviceState) {
        {
            let mut statuses = self.statuses.lock();
            if let Some(s) = statuses.get_mut(task_id) {
                s.last_state = last_state;
                s.state = current_state;
            }
        }

        if current_state == DeviceState::Error || (current_state == DeviceState::Exiting && last_state != DeviceState::Idle) {
            self.handle_task_lost(task_id);
        }

        self.change_ops.update_for_task(task_id, |ctx, _| {
            if current_state == ctx.transition.expected_state() {
                ctx.pending.remove(&task_id);
            }
            ctx.pending.is_empty().then_some(OpOutcome::Completed(Ok(())))
        });

        self.wait_ops.update_for_task(task_id, |ctx, _| {
            let last_ok = ctx.target_last.map(|t| t == last_state).unwrap_or(true);
            if last_ok && current_state == ctx.target_current {
                ctx.pending.remove(&task_id);
            }
            ctx.pending.is_empty().then_some(OpOutcome::Completed(Ok(())))
        });
    }

    fn handle_transition_status(
        &self,
        task_id: TaskId,
        result: ReplyResult,
        transition: Transition,
        current_state: DeviceState,
    ) {
        if result == ReplyResult::Success {
            return;
        }
        self.change_ops.update_for_task(task_id, |ctx, _| {
            if ctx.transition != transition {
                return None;
            }
            if current_state == ctx.transition.expected_state() {
                ctx.pending.remove(&task_id);
                ctx.pending.is_empty().then_some(OpOutcome::Completed(Ok(())))
            } else {
                Some(OpOutcome::Completed(Err(OdcError::new(
                    ErrorCode::DeviceChangeStateInvalidTransition,
                    format!("task {task_id} failed transition {transition}"),
                ))))
            }
        });
    }

    /// §4.5: applies `IgnoreExpendable` to a task that just entered `Error`
    /// or exited unexpectedly, then retires it out of every pending
    /// operation that was waiting on it.
    fn handle_task_lost(&self, task_id: TaskId) {
        let outcome = {
            let mut statuses = self.statuses.lock();
            let template_of = self.template_of.lock();
            let mut collection_info = self.collection_info.lock();
            apply_ignore_expendable(&mut statuses, task_id, &template_of, &mut collection_info)
        };

        let hard_err = matches!(outcome, PolicyOutcome::HardFailure)
            .then(|| OdcError::new(ErrorCode::FairMqChangeStateFailed, format!("task {task_id} lost without quorum")));

        if let PolicyOutcome::AbsorbedQuorum { collection_id } = outcome {
            tracing::warn!(%task_id, %collection_id, "quorum absorbs runtime collection loss");
            self.shutdown_collection_agents_best_effort(collection_id);
        }

        self.change_ops.update_for_task(task_id, |ctx, _| {
            ctx.pending.remove(&task_id);
            if let Some(e) = &hard_err {
                return Some(OpOutcome::Completed(Err(e.clone())));
            }
            ctx.pending.is_empty().then_some(OpOutcome::Completed(Ok(())))
        });
        self.wait_ops.update_for_task(task_id, |ctx, _| {
            ctx.pending.remove(&task_id);
            if let Some(e) = &hard_err {
                return Some(OpOutcome::Completed(Err(e.clone())));
            }
            ctx.pending.is_empty().then_some(OpOutcome::Completed(Ok(())))
        });
        self.set_prop_ops.update_for_task(task_id, |ctx, _| {
            ctx.pending.remove(&task_id);
            ctx.failed.insert(task_id);
            ctx.pending.is_empty().then(|| OpOutcome::Completed(ctx.failed.clone()))
        });
        self.get_prop_ops.update_for_task(task_id, |ctx, _| {
            ctx.pending.remove(&task_id);
            ctx.failed.insert(task_id);
            ctx.pending.is_empty().then(|| {
                OpOutcome::Completed(GetPropertiesOutcome { props: ctx.props.clone(), failed: ctx.failed.clone() })
            })
        });
    }

    fn shutdown_collection_agents_best_effort(&self, collection_id: RuntimeCollectionId) {
        let agents: Vec<AgentId> = {
            let collection_info = self.collection_info.lock();
            let template_of = self.template_of.lock();
            template_of
                .get(&collection_id)
                .and_then(|name| collection_info.get(name))
                .and_then(|info| info.runtime_collection_agents.get(&collection_id).copied())
                .into_iter()
                .collect()
        };
        for agent_id in agents {
            let deploy = Arc::clone(&self.deploy);
            let session_id = self.session_id.clone();
            tokio::spawn(async move {
                if let Err(e) = deploy.shutdown_agent(&session_id, agent_id).await {
                    tracing::warn!(%agent_id, error = %e, "best-effort agent shutdown failed");
                }
            });
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
