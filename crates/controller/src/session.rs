// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-partition session state (§4.1, §4.7): the deployment session handle,
//! the topology tables produced at `Activate`/`Update`, and the
//! coarse-grained state machine that gates which verb is legal next.

use odc_core::error::{ErrorCode, OdcError};
use odc_core::model::{CollectionDetails, DeploymentSessionId, PartitionId, TaskDetails};
use odc_coordinator::TopologyCoordinator;
use odc_deploy::DeploymentAdapter;
use std::sync::Arc;

/// Coarse session lifecycle (§4.7): `Uninitialized -> Initialized ->
/// Submitted -> Activated <-> Running -> Reset -> Terminated`. `Shutdown`
/// is not a resting state — a session in that transition is removed from
/// the controller's partition map rather than kept around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initialized,
    Submitted,
    Activated,
    Running,
    Reset,
    Terminated,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Live state for one partition. One `Session` exists per entry in the
/// controller's partition map for as long as the partition has not been
/// shut down.
pub struct Session<A: DeploymentAdapter> {
    pub partition_id: PartitionId,
    pub state: SessionState,
    pub deployment_session_id: Option<DeploymentSessionId>,
    pub run_nr: u64,
    /// §4.1 "refused if `Run` was already attempted on that partition" —
    /// set the first time `Run` succeeds or fails past the point of no
    /// return, never cleared by anything short of `Shutdown`.
    pub run_attempted: bool,
    pub coordinator: Option<Arc<TopologyCoordinator<A>>>,
    pub task_details: Vec<TaskDetails>,
    pub collection_details: Vec<CollectionDetails>,
    pub hosts: Vec<String>,
}

impl<A: DeploymentAdapter> Session<A> {
    pub fn new(partition_id: PartitionId) -> Self {
        Self {
            partition_id,
            state: SessionState::Uninitialized,
            deployment_session_id: None,
            run_nr: 0,
            run_attempted: false,
            coordinator: None,
            task_details: Vec::new(),
            collection_details: Vec::new(),
            hosts: Vec::new(),
        }
    }

    /// §4.1/§4.7's verb-vs-state guard: returns `RequestNotSupported` naming
    /// the verb and the current state when `verb` isn't legal right now.
    pub fn require_state(&self, verb: &str, allowed: &[SessionState]) -> Result<(), OdcError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(OdcError::new(
                ErrorCode::RequestNotSupported,
                format!("{verb} not valid in state {} (partition {})", self.state, self.partition_id),
            ))
        }
    }

    pub fn coordinator(&self) -> Result<&Arc<TopologyCoordinator<A>>, OdcError> {
        self.coordinator.as_ref().ok_or_else(|| {
            OdcError::new(ErrorCode::RequestNotSupported, format!("partition {} has no activated topology", self.partition_id))
        })
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
