// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The client request surface (§6): one params record per verb, all
//! carrying [`CommonParams`], and the uniform [`RequestResult`] response
//! shape.

use crate::error::OdcError;
use crate::model::{PartitionId, TaskStateDetail};
use crate::state::AggregatedState;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters common to every client request (§6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonParams {
    pub partition_id: PartitionId,
    pub run_nr: u64,
    pub timeout: Duration,
}

impl CommonParams {
    pub fn new(partition_id: impl Into<PartitionId>, run_nr: u64, timeout: Duration) -> Self {
        Self {
            partition_id: partition_id.into(),
            run_nr,
            timeout,
        }
    }
}

/// One of exactly one `{topoFile | topoContent | topoScript}` source (§4.2,
/// §6): "Fails with TopologyFailed if multiple ... are supplied".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopologySource {
    File(String),
    Content(String),
    Script(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeParams {
    pub dds_session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitParams {
    pub plugin: String,
    pub resources: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateParams {
    pub topology: TopologySource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParams {
    pub submit: SubmitParams,
    pub activate: ActivateParams,
    pub extract_topo_resources: bool,
}

pub type UpdateParams = ActivateParams;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathParams {
    /// Empty path means "the whole topology" (§4.6).
    pub path: String,
    pub detailed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPropertiesParams {
    pub path: String,
    pub props: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetPropertiesParams {
    pub path: String,
    /// Regex filter applied by the device runtime (§6 `GetProperties(requestID, regex)`).
    pub query: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusParams {
    pub only_running: bool,
}

/// The uniform response shape (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestResult {
    pub partition_id: PartitionId,
    pub run_nr: u64,
    pub dds_session_id: Option<String>,
    pub aggregated_state: AggregatedState,
    pub msg: String,
    pub exec_time_ms: u64,
    pub error: Option<OdcError>,
    pub detailed: Option<Vec<TaskStateDetail>>,
    pub hosts: Vec<String>,
}

impl RequestResult {
    pub fn ok(partition_id: PartitionId, run_nr: u64, aggregated_state: AggregatedState) -> Self {
        Self {
            partition_id,
            run_nr,
            dds_session_id: None,
            aggregated_state,
            msg: String::new(),
            exec_time_ms: 0,
            error: None,
            detailed: None,
            hosts: Vec::new(),
        }
    }

    pub fn failed(
        partition_id: PartitionId,
        run_nr: u64,
        aggregated_state: AggregatedState,
        error: OdcError,
    ) -> Self {
        let msg = error.to_string();
        Self {
            partition_id,
            run_nr,
            dds_session_id: None,
            aggregated_state,
            msg,
            exec_time_ms: 0,
            error: Some(error),
            detailed: None,
            hosts: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn with_detailed(mut self, detailed: Vec<TaskStateDetail>) -> Self {
        self.detailed = Some(detailed);
        self
    }

    pub fn with_hosts(mut self, hosts: Vec<String>) -> Self {
        self.hosts = hosts;
        self
    }

    pub fn with_exec_time(mut self, exec_time_ms: u64) -> Self {
        self.exec_time_ms = exec_time_ms;
        self
    }

    pub fn with_dds_session_id(mut self, id: Option<String>) -> Self {
        self.dds_session_id = id;
        self
    }
}

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;
