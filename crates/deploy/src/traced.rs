// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing wrapper for any [`DeploymentAdapter`], for consistent
//! observability across whichever deployment runtime is wired in.

use crate::adapter::{
    AgentInfo, DdsSubmitParams, DeployError, DeploymentAdapter, DeviceCommand, DeviceReply,
    SlotCounts, SubmitEvent, TaskDoneEvent, TopologyResponseEvent,
};
use async_trait::async_trait;
use odc_core::model::AgentId;
use tokio::sync::mpsc;
use tracing::Instrument;

/// Wraps any [`DeploymentAdapter`] with per-call tracing spans.
#[derive(Clone)]
pub struct TracedDeploymentAdapter<A> {
    inner: A,
}

impl<A> TracedDeploymentAdapter<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<A: DeploymentAdapter> DeploymentAdapter for TracedDeploymentAdapter<A> {
    async fn create_session(&self) -> Result<String, DeployError> {
        async {
            let result = self.inner.create_session().await;
            match &result {
                Ok(id) => tracing::info!(session_id = %id, "session created"),
                Err(e) => tracing::error!(error = %e, "create session failed"),
            }
            result
        }
        .instrument(tracing::info_span!("deploy.create_session"))
        .await
    }

    async fn attach_session(&self, session_id: &str) -> Result<String, DeployError> {
        let result = self.inner.attach_session(session_id).await;
        if let Err(ref e) = result {
            tracing::error!(session_id, error = %e, "attach session failed");
        }
        result
    }

    async fn shutdown_session(&self, session_id: &str) -> Result<(), DeployError> {
        let result = self.inner.shutdown_session(session_id).await;
        tracing::info_span!("deploy.shutdown_session", session_id).in_scope(|| match &result {
            Ok(()) => tracing::info!("session shut down"),
            Err(e) => tracing::error!(error = %e, "shutdown failed"),
        });
        result
    }

    async fn submit_agents(
        &self,
        session_id: &str,
        params: &[DdsSubmitParams],
    ) -> Result<mpsc::Receiver<SubmitEvent>, DeployError> {
        let start = std::time::Instant::now();
        let result = self.inner.submit_agents(session_id, params).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => tracing::info!(session_id, groups = params.len(), elapsed_ms, "agents submitted"),
            Err(e) => tracing::error!(session_id, elapsed_ms, error = %e, "submit agents failed"),
        }
        result
    }

    async fn activate_topology(
        &self,
        session_id: &str,
        topo_file: &str,
    ) -> Result<Vec<TopologyResponseEvent>, DeployError> {
        let start = std::time::Instant::now();
        let result = self.inner.activate_topology(session_id, topo_file).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(tasks) => {
                tracing::info!(session_id, topo_file, tasks = tasks.len(), elapsed_ms, "topology activated")
            }
            Err(e) => tracing::error!(session_id, elapsed_ms, error = %e, "activate topology failed"),
        }
        result
    }

    async fn subscribe_task_done(
        &self,
        session_id: &str,
    ) -> Result<mpsc::Receiver<TaskDoneEvent>, DeployError> {
        self.inner.subscribe_task_done(session_id).await
    }

    async fn send_command(
        &self,
        session_id: &str,
        command: &DeviceCommand,
        path_filter: Option<&str>,
    ) -> Result<(), DeployError> {
        tracing::debug!(session_id, ?command, path_filter, "sending command");
        self.inner.send_command(session_id, command, path_filter).await
    }

    async fn subscribe_replies(
        &self,
        session_id: &str,
    ) -> Result<mpsc::Receiver<DeviceReply>, DeployError> {
        self.inner.subscribe_replies(session_id).await
    }

    async fn slot_counts(&self, session_id: &str) -> Result<SlotCounts, DeployError> {
        self.inner.slot_counts(session_id).await
    }

    async fn agent_info(&self, session_id: &str) -> Result<Vec<AgentInfo>, DeployError> {
        self.inner.agent_info(session_id).await
    }

    async fn shutdown_agent(&self, session_id: &str, agent_id: AgentId) -> Result<(), DeployError> {
        let result = self.inner.shutdown_agent(session_id, agent_id).await;
        tracing::info_span!("deploy.shutdown_agent", session_id, %agent_id).in_scope(|| {
            match &result {
                Ok(()) => tracing::warn!("agent shut down (fault-tolerance absorption)"),
                Err(e) => tracing::error!(error = %e, "shutdown agent failed"),
            }
        });
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
