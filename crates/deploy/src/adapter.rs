// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The deployment-layer contract consumed by the core (§6): session
//! lifecycle, agent submission, topology activation, the custom-command
//! channel, and agent/slot queries. This crate never implements the
//! dynamic-deployment runtime itself — that subsystem is out of scope
//! (§1) — it only types the boundary and supplies a fake for tests.

use async_trait::async_trait;
use odc_core::model::{AgentGroupName, AgentId, RuntimeCollectionId, SlotId, TaskId};
use odc_core::state::{DeviceState, Transition};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from the deployment layer, mapped to `OdcError` taxonomy codes
/// (§7) by the caller — this crate's errors are narrower than the full
/// taxonomy because it knows nothing about device state-machine semantics.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("create session failed: {0}")]
    CreateSessionFailed(String),
    #[error("attach to session failed: {0}")]
    AttachFailed(String),
    #[error("shutdown session failed: {0}")]
    ShutdownFailed(String),
    #[error("submit agents failed: {0}")]
    SubmitFailed(String),
    #[error("activate topology failed: {0}")]
    ActivateFailed(String),
    #[error("resource plugin failed: {0}")]
    ResourcePluginFailed(String),
    #[error("agent {0} not found")]
    AgentNotFound(u64),
}

/// One submission-parameter record produced by the resource-plugin adapter
/// or synthesised directly from `agentGroupInfo` (§4.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DdsSubmitParams {
    pub rms: String,
    pub num_agents: u32,
    pub min_agents: u32,
    pub num_slots: u32,
    pub num_cores: u32,
    pub config_file: String,
    pub env_file: String,
    pub agent_group: AgentGroupName,
}

/// Severity of a `SubmitResponse` event from the deployment layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Events streamed back while agents are being submitted (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SubmitEvent {
    Response { severity: Severity, message: String },
    Done,
}

/// Per-task result of a topology activation/update (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyResponseEvent {
    pub agent_id: AgentId,
    pub slot_id: SlotId,
    pub task_id: TaskId,
    pub collection_id: RuntimeCollectionId,
    pub path: String,
    pub host: String,
    pub wrk_dir: String,
    pub activated: bool,
}

/// A task-done notification from the deployment layer (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDoneEvent {
    pub task_id: TaskId,
    pub task_path: String,
    pub exit_code: Option<i32>,
    pub signal: Option<i32>,
    pub host: String,
    pub wrk_dir: String,
}

/// A command sent on the multiplexed custom-command channel (§6 device
/// command vocabulary).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeviceCommand {
    ChangeState(Transition),
    SubscribeToStateChange { interval_ms: u64 },
    UnsubscribeFromStateChange,
    SubscriptionHeartbeat { interval_ms: u64 },
    SetProperties { request_id: u64, props: Vec<(String, String)> },
    GetProperties { request_id: u64, regex: String },
}

/// Result discriminant carried by several device replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyResult {
    Success,
    Failure,
}

/// A reply arriving on the custom-command channel (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeviceReply {
    StateChangeSubscription { task_id: TaskId, result: ReplyResult },
    StateChangeUnsubscription { task_id: TaskId, result: ReplyResult },
    StateChange {
        task_id: TaskId,
        last_state: DeviceState,
        current_state: DeviceState,
    },
    TransitionStatus {
        task_id: TaskId,
        result: ReplyResult,
        transition: Transition,
        current_state: DeviceState,
    },
    Properties {
        task_id: TaskId,
        request_id: u64,
        result: ReplyResult,
        props: Vec<(String, String)>,
    },
    PropertiesSet {
        task_id: TaskId,
        request_id: u64,
        result: ReplyResult,
    },
}

/// Aggregate agent/slot accounting returned by a slot-count query (§6).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotCounts {
    pub total_slots: u32,
    pub agent_slots: u32,
}

/// One entry in the deployment layer's agent-info list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub agent_id: AgentId,
    pub host: String,
    pub num_slots: u32,
}

/// The dynamic-deployment runtime's API surface, as consumed by the core
/// (§1, §6). Implementors own the real session-creation, agent-submission,
/// and command-transport machinery; this crate only types the boundary.
#[async_trait]
pub trait DeploymentAdapter: Send + Sync + 'static {
    /// Create a brand-new deployment session, returning its UUID.
    async fn create_session(&self) -> Result<String, DeployError>;

    /// Attach to an existing session by UUID, returning it unchanged on
    /// success (attach semantics per §4.1 "Initialize ... attaches").
    async fn attach_session(&self, session_id: &str) -> Result<String, DeployError>;

    /// Tear down a session; idempotent on an already-gone session.
    async fn shutdown_session(&self, session_id: &str) -> Result<(), DeployError>;

    /// Submit agents described by `params`, streaming `SubmitResponse`
    /// events followed by `Done` on the returned channel.
    async fn submit_agents(
        &self,
        session_id: &str,
        params: &[DdsSubmitParams],
    ) -> Result<mpsc::Receiver<SubmitEvent>, DeployError>;

    /// Activate (or, for `Update`, re-activate) a topology file against a
    /// session, streaming one `TopologyResponseEvent` per task.
    async fn activate_topology(
        &self,
        session_id: &str,
        topo_file: &str,
    ) -> Result<Vec<TopologyResponseEvent>, DeployError>;

    /// Subscribe to task-done notifications for the lifetime of the
    /// session (§4.4(c)).
    async fn subscribe_task_done(
        &self,
        session_id: &str,
    ) -> Result<mpsc::Receiver<TaskDoneEvent>, DeployError>;

    /// Broadcast a command, optionally filtered by topology path
    /// (§4.4(d), §6).
    async fn send_command(
        &self,
        session_id: &str,
        command: &DeviceCommand,
        path_filter: Option<&str>,
    ) -> Result<(), DeployError>;

    /// Subscribe to device replies on the custom-command channel
    /// (§4.4(b)).
    async fn subscribe_replies(
        &self,
        session_id: &str,
    ) -> Result<mpsc::Receiver<DeviceReply>, DeployError>;

    /// Query current slot accounting for a session.
    async fn slot_counts(&self, session_id: &str) -> Result<SlotCounts, DeployError>;

    /// List agents currently known to a session.
    async fn agent_info(&self, session_id: &str) -> Result<Vec<AgentInfo>, DeployError>;

    /// Shut down a single agent by ID (used by the failure policy to tear
    /// down the host backing a lost runtime collection, §4.5 rule 3).
    async fn shutdown_agent(&self, session_id: &str, agent_id: AgentId) -> Result<(), DeployError>;
}

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;
