// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake deployment adapter for testing, grounded on the call-recording
//! style of a fake terminal-session adapter: every method records an
//! entry so tests can assert on what the coordinator actually sent.
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::adapter::{
    AgentInfo, DdsSubmitParams, DeployError, DeploymentAdapter, DeviceCommand, DeviceReply,
    SlotCounts, SubmitEvent, TaskDoneEvent, TopologyResponseEvent,
};
use async_trait::async_trait;
use odc_core::model::AgentId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Recorded call into a [`FakeDeploymentAdapter`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeployCall {
    CreateSession,
    AttachSession { session_id: String },
    ShutdownSession { session_id: String },
    SubmitAgents { session_id: String, params: Vec<DdsSubmitParams> },
    ActivateTopology { session_id: String, topo_file: String },
    SendCommand {
        session_id: String,
        command: DeviceCommand,
        path_filter: Option<String>,
    },
    ShutdownAgent { session_id: String, agent_id: AgentId },
}

struct FakeState {
    sessions: HashMap<String, Vec<TopologyResponseEvent>>,
    calls: Vec<DeployCall>,
    next_session: u64,
    reply_tx: HashMap<String, mpsc::Sender<DeviceReply>>,
    task_done_tx: HashMap<String, mpsc::Sender<TaskDoneEvent>>,
    slot_counts: SlotCounts,
    agents: Vec<AgentInfo>,
}

/// In-memory stand-in for the dynamic-deployment runtime (§6 contract).
/// Tests drive the coordinator by pushing [`DeviceReply`]/[`TaskDoneEvent`]
/// values onto the channels this adapter hands back from `subscribe_*`.
#[derive(Clone)]
pub struct FakeDeploymentAdapter {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeDeploymentAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                sessions: HashMap::new(),
                calls: Vec::new(),
                next_session: 0,
                reply_tx: HashMap::new(),
                task_done_tx: HashMap::new(),
                slot_counts: SlotCounts::default(),
                agents: Vec::new(),
            })),
        }
    }
}

impl FakeDeploymentAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DeployCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_activation_plan(&self, session_id: &str, events: Vec<TopologyResponseEvent>) {
        self.inner
            .lock()
            .sessions
            .insert(session_id.to_string(), events);
    }

    pub fn set_slot_counts(&self, counts: SlotCounts) {
        self.inner.lock().slot_counts = counts;
    }

    pub fn set_agents(&self, agents: Vec<AgentInfo>) {
        self.inner.lock().agents = agents;
    }

    /// Push a device reply onto the channel a test-controlled coordinator
    /// is reading via `subscribe_replies`.
    pub async fn push_reply(&self, session_id: &str, reply: DeviceReply) -> bool {
        let tx = self.inner.lock().reply_tx.get(session_id).cloned();
        match tx {
            Some(tx) => tx.send(reply).await.is_ok(),
            None => false,
        }
    }

    /// Push a task-done event onto the channel a test-controlled
    /// coordinator is reading via `subscribe_task_done`.
    pub async fn push_task_done(&self, session_id: &str, event: TaskDoneEvent) -> bool {
        let tx = self.inner.lock().task_done_tx.get(session_id).cloned();
        match tx {
            Some(tx) => tx.send(event).await.is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl DeploymentAdapter for FakeDeploymentAdapter {
    async fn create_session(&self) -> Result<String, DeployError> {
        let mut inner = self.inner.lock();
        inner.calls.push(DeployCall::CreateSession);
        inner.next_session += 1;
        let id = format!("fake-session-{}", inner.next_session);
        inner.sessions.insert(id.clone(), Vec::new());
        Ok(id)
    }

    async fn attach_session(&self, session_id: &str) -> Result<String, DeployError> {
        let mut inner = self.inner.lock();
        inner.calls.push(DeployCall::AttachSession {
            session_id: session_id.to_string(),
        });
        if !inner.sessions.contains_key(session_id) {
            inner
                .sessions
                .insert(session_id.to_string(), Vec::new());
        }
        Ok(session_id.to_string())
    }

    async fn shutdown_session(&self, session_id: &str) -> Result<(), DeployError> {
        let mut inner = self.inner.lock();
        inner.calls.push(DeployCall::ShutdownSession {
            session_id: session_id.to_string(),
        });
        inner.sessions.remove(session_id);
        inner.reply_tx.remove(session_id);
        inner.task_done_tx.remove(session_id);
        Ok(())
    }

    async fn submit_agents(
        &self,
        session_id: &str,
        params: &[DdsSubmitParams],
    ) -> Result<mpsc::Receiver<SubmitEvent>, DeployError> {
        self.inner.lock().calls.push(DeployCall::SubmitAgents {
            session_id: session_id.to_string(),
            params: params.to_vec(),
        });
        let (tx, rx) = mpsc::channel(16);
        let _ = tx.send(SubmitEvent::Done).await;
        Ok(rx)
    }

    async fn activate_topology(
        &self,
        session_id: &str,
        topo_file: &str,
    ) -> Result<Vec<TopologyResponseEvent>, DeployError> {
        let mut inner = self.inner.lock();
        inner.calls.push(DeployCall::ActivateTopology {
            session_id: session_id.to_string(),
            topo_file: topo_file.to_string(),
        });
        inner
            .sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| DeployError::SessionNotFound(session_id.to_string()))
    }

    async fn subscribe_task_done(
        &self,
        session_id: &str,
    ) -> Result<mpsc::Receiver<TaskDoneEvent>, DeployError> {
        let (tx, rx) = mpsc::channel(64);
        self.inner
            .lock()
            .task_done_tx
            .insert(session_id.to_string(), tx);
        Ok(rx)
    }

    async fn send_command(
        &self,
        session_id: &str,
        command: &DeviceCommand,
        path_filter: Option<&str>,
    ) -> Result<(), DeployError> {
        self.inner.lock().calls.push(DeployCall::SendCommand {
            session_id: session_id.to_string(),
            command: command.clone(),
            path_filter: path_filter.map(str::to_string),
        });
        Ok(())
    }

    async fn subscribe_replies(
        &self,
        session_id: &str,
    ) -> Result<mpsc::Receiver<DeviceReply>, DeployError> {
        let (tx, rx) = mpsc::channel(64);
        self.inner
            .lock()
            .reply_tx
            .insert(session_id.to_string(), tx);
        Ok(rx)
    }

    async fn slot_counts(&self, _session_id: &str) -> Result<SlotCounts, DeployError> {
        Ok(self.inner.lock().slot_counts.clone())
    }

    async fn agent_info(&self, _session_id: &str) -> Result<Vec<AgentInfo>, DeployError> {
        Ok(self.inner.lock().agents.clone())
    }

    async fn shutdown_agent(&self, session_id: &str, agent_id: AgentId) -> Result<(), DeployError> {
        self.inner.lock().calls.push(DeployCall::ShutdownAgent {
            session_id: session_id.to_string(),
            agent_id,
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
