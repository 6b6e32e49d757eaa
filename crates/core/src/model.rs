// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Zone/group/collection/task data model extracted from a topology document
//! (§3), and the per-runtime-task [`DeviceStatus`] the coordinator keeps in
//! a contiguous array.

use crate::state::DeviceState;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

crate::define_id! {
    /// An externally named tenant of the controller (GLOSSARY: Partition).
    pub struct PartitionId;
}

crate::define_id! {
    /// Identifies a deployment-layer session attached to a partition.
    pub struct DeploymentSessionId;
}

crate::define_id! {
    /// Name of a zone (resource pool) in the topology.
    pub struct ZoneName;
}

crate::define_id! {
    /// Name of an agent group in the topology.
    pub struct AgentGroupName;
}

crate::define_id! {
    /// Name of a collection template in the topology (e.g. `Sampler`).
    pub struct CollectionName;
}

crate::define_numeric_id! {
    /// Runtime task identifier (GLOSSARY: Task), assigned at activation.
    pub struct TaskId;
}

crate::define_numeric_id! {
    /// Runtime collection identifier, one per instantiated collection (GLOSSARY: Collection).
    pub struct RuntimeCollectionId;
}

crate::define_numeric_id! {
    /// Worker-node agent identifier (GLOSSARY: Agent).
    pub struct AgentId;
}

crate::define_numeric_id! {
    /// Execution-capacity slot identifier (GLOSSARY: Slot).
    pub struct SlotId;
}

/// One `{n, nCores, agentGroup}` entry inside a [`ZoneInfo`] (§3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneGroup {
    pub n: u32,
    pub n_cores: u32,
    pub agent_group: AgentGroupName,
}

/// A named resource pool with one or more [`ZoneGroup`]s (§3).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneInfo {
    pub groups: Vec<ZoneGroup>,
}

/// Aggregated per-agent-group demand (§3, §4.2 rule 4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentGroupInfo {
    pub name: AgentGroupName,
    pub zone: ZoneName,
    pub num_agents: u32,
    pub min_agents: u32,
    pub num_slots: u32,
    pub num_cores: u32,
}

/// Metadata for a single collection template extracted from the topology (§3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: CollectionName,
    pub zone: ZoneName,
    pub agent_group: AgentGroupName,
    pub topo_parent: String,
    pub topo_path: String,
    pub n_original: u32,
    pub n_current: u32,
    /// `-1` means "no nMin declared"; quorum can never be satisfied (§4.5).
    pub n_min: i32,
    pub n_cores: u32,
    pub num_tasks: u32,
    pub total_tasks: u32,
    /// Runtime-collection ID to the agent hosting it, populated at activation.
    pub runtime_collection_agents: HashMap<RuntimeCollectionId, AgentId>,
    /// Runtime collections that have already had at least one task failure
    /// absorbed against this template's quorum (§4.5 rule 3).
    pub failed_runtime_collections: HashSet<RuntimeCollectionId>,
}

impl CollectionInfo {
    /// §4.5 rule 3's `CheckNmin`: `true` means the failure can be absorbed
    /// (the whole runtime collection instance is ignored); `false` means it
    /// is a hard failure.
    pub fn quorum_holds_after_loss(&self) -> bool {
        self.n_min != -1 && self.n_current as i32 >= self.n_min
    }
}

/// Metadata for a standalone task (not inside a collection) (§3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub name: String,
    pub zone: ZoneName,
    pub agent_group: AgentGroupName,
    pub topo_parent: String,
    pub n: u32,
}

/// Immutable per-task diagnostics filled in during activation (§3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetails {
    pub agent_id: AgentId,
    pub slot_id: SlotId,
    pub task_id: TaskId,
    pub collection_id: RuntimeCollectionId,
    pub path: String,
    pub host: String,
    pub wrk_dir: String,
    pub rms_job_id: String,
}

/// Live per-task diagnostics reported by `GetState(detailed)` and by the
/// failure path of a `ChangeState`/`SetProperties` verb (§6
/// `stateSummaryOnFailure`). Unlike [`TaskDetails`], `state` reflects the
/// task's current [`DeviceState`] rather than its activation-time facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStateDetail {
    pub task_id: TaskId,
    pub collection_id: RuntimeCollectionId,
    pub state: DeviceState,
    pub host: String,
}

/// Immutable per-collection diagnostics filled in during activation (§3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDetails {
    pub agent_id: AgentId,
    pub collection_id: RuntimeCollectionId,
    pub path: String,
    pub host: String,
    pub wrk_dir: String,
}

/// One entry per runtime task in the coordinator's `DeviceStatus` array
/// (§3). Created once at topology activation and mutated by subscription
/// confirmation, state-change notifications, and task-done notifications;
/// never destroyed until the topology is reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub task_id: TaskId,
    pub collection_id: RuntimeCollectionId,
    pub last_state: DeviceState,
    pub state: DeviceState,
    pub expendable: bool,
    pub ignored: bool,
    pub subscribed_to_state_changes: bool,
    pub exit_code: Option<i32>,
    pub signal: Option<i32>,
}

impl DeviceStatus {
    pub fn new(task_id: TaskId, collection_id: RuntimeCollectionId, expendable: bool) -> Self {
        Self {
            task_id,
            collection_id,
            last_state: DeviceState::Undefined,
            state: DeviceState::Undefined,
            expendable,
            ignored: false,
            subscribed_to_state_changes: false,
            exit_code: None,
            signal: None,
        }
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
