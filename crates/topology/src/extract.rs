// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Requirements extractor (§4.2): walks a parsed [`TopologyDocument`] and
//! produces the tables a `Session` keeps — zone/agent-group demand,
//! collection and standalone-task metadata, and the set of task template
//! paths marked expendable.

use crate::doc::{CollectionNode, GroupNode, TaskNode, ROOT_GROUP};
use odc_core::error::{ErrorCode, OdcError};
use odc_core::model::{AgentGroupInfo, AgentGroupName, CollectionInfo, CollectionName, TaskInfo, ZoneGroup, ZoneInfo, ZoneName};
use std::collections::{HashMap, HashSet};

const EXPENDABLE_PREFIX: &str = "odc_expendable_";
const ZONE_PREFIX: &str = "odc_zone_";
const NCORES_PREFIX: &str = "odc_ncores_";
const NMIN_PREFIX: &str = "odc_nmin_";
const GROUP_NAME_KEY: &str = "GroupName";

/// All tables populated by the requirements extractor (§4.2).
#[derive(Debug, Clone, Default)]
pub struct ExtractedTopology {
    pub zone_info: HashMap<ZoneName, ZoneInfo>,
    pub agent_group_info: HashMap<AgentGroupName, AgentGroupInfo>,
    pub collections: HashMap<String, CollectionInfo>,
    pub standalone_tasks: HashMap<String, TaskInfo>,
    /// Template paths (not runtime task IDs — those don't exist yet at
    /// extraction time) whose tasks are marked expendable.
    pub expendable_task_paths: HashSet<String>,
}

struct Walker {
    result: ExtractedTopology,
}

fn requirement_value<'a>(node_reqs: &'a [crate::doc::Requirement], prefix: &str) -> Option<&'a str> {
    node_reqs
        .iter()
        .find(|r| r.name.starts_with(prefix))
        .map(|r| r.value.as_str())
}

fn bare_requirement<'a>(node_reqs: &'a [crate::doc::Requirement], name: &str) -> Option<&'a str> {
    node_reqs
        .iter()
        .find(|r| r.name == name)
        .map(|r| r.value.as_str())
}

impl Walker {
    fn new() -> Self {
        Self {
            result: ExtractedTopology::default(),
        }
    }

    fn check_expendable(&mut self, path: &str, reqs: &[crate::doc::Requirement]) {
        if let Some(value) = requirement_value(reqs, EXPENDABLE_PREFIX) {
            match value {
                "true" => {
                    self.result.expendable_task_paths.insert(path.to_string());
                }
                "false" => {}
                other => {
                    tracing::warn!(path = %path, value = %other, "unrecognized odc_expendable_ value");
                }
            }
        }
    }

    fn agent_group_name(&self, reqs: &[crate::doc::Requirement]) -> AgentGroupName {
        bare_requirement(reqs, GROUP_NAME_KEY)
            .unwrap_or("")
            .to_string()
            .into()
    }

    fn zone_name(&self, reqs: &[crate::doc::Requirement], fallback: &AgentGroupName) -> ZoneName {
        requirement_value(reqs, ZONE_PREFIX)
            .map(|z| z.to_string())
            .unwrap_or_else(|| fallback.to_string())
            .into()
    }

    fn walk_group(&mut self, group: &GroupNode, parent_path: &str, is_root: bool) {
        let path = if parent_path.is_empty() {
            group.name.clone()
        } else {
            format!("{parent_path}/{}", group.name)
        };

        for task in &group.tasks {
            self.walk_standalone_task(task, &path, is_root);
        }
        for collection in &group.collections {
            self.walk_collection(collection, &path, is_root);
        }
        for child in &group.groups {
            self.walk_group(child, &path, false);
        }
    }

    fn walk_standalone_task(&mut self, task: &TaskNode, parent_path: &str, parent_is_root: bool) {
        let path = format!("{parent_path}/{}", task.name);
        self.check_expendable(&path, &task.requirements);

        // Rule 2: only tasks whose parent is not the root group are recorded.
        if parent_is_root {
            return;
        }

        let agent_group = self.agent_group_name(&task.requirements);
        let zone = self.zone_name(&task.requirements, &agent_group);

        self.result.standalone_tasks.insert(
            path.clone(),
            TaskInfo {
                name: task.name.clone(),
                zone: zone.clone(),
                agent_group: agent_group.clone(),
                topo_parent: parent_path.to_string(),
                n: task.n,
            },
        );

        if !agent_group.to_string().is_empty() {
            self.aggregate_agent_group(&agent_group, &zone, task.n, task.n, 0, 0);
        }
    }

    fn walk_collection(&mut self, collection: &CollectionNode, parent_path: &str, parent_is_root: bool) {
        let path = format!("{parent_path}/{}", collection.name);

        for task in &collection.tasks {
            let task_path = format!("{path}/{}", task.name);
            self.check_expendable(&task_path, &task.requirements);
        }

        let agent_group = self.agent_group_name(&collection.requirements);
        let zone = self.zone_name(&collection.requirements, &agent_group);
        let n_cores = requirement_value(&collection.requirements, NCORES_PREFIX)
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);
        // Rule 3: nMin is only recorded inside a non-root group.
        let n_min = if parent_is_root {
            -1
        } else {
            requirement_value(&collection.requirements, NMIN_PREFIX)
                .and_then(|v| v.parse::<i32>().ok())
                .unwrap_or(-1)
        };

        let num_tasks = collection.tasks.len() as u32;
        let total_tasks = num_tasks * collection.n;

        let info = CollectionInfo {
            name: CollectionName::from(collection.name.clone()),
            zone: zone.clone(),
            agent_group: agent_group.clone(),
            topo_parent: parent_path.to_string(),
            topo_path: path.clone(),
            n_original: collection.n,
            n_current: collection.n,
            n_min,
            n_cores,
            num_tasks,
            total_tasks,
            runtime_collection_agents: HashMap::new(),
            failed_runtime_collections: HashSet::new(),
        };
        self.result.collections.insert(path.clone(), info);

        if !agent_group.to_string().is_empty() {
            self.aggregate_agent_group(&agent_group, &zone, collection.n, num_tasks, n_cores, 1);
        }
    }

    /// Rule 4: `numAgents += n`, `numSlots += numTasks`, adopt
    /// zone/minAgents/numCores from whichever collection/task carries them.
    fn aggregate_agent_group(
        &mut self,
        agent_group: &AgentGroupName,
        zone: &ZoneName,
        n: u32,
        num_tasks: u32,
        n_cores: u32,
        min_agents: u32,
    ) {
        let entry = self
            .result
            .agent_group_info
            .entry(agent_group.clone())
            .or_insert_with(|| AgentGroupInfo {
                name: agent_group.clone(),
                zone: zone.clone(),
                num_agents: 0,
                min_agents: 0,
                num_slots: 0,
                num_cores: 0,
            });
        entry.num_agents += n;
        entry.num_slots += num_tasks;
        if n_cores > 0 {
            entry.num_cores = n_cores;
        }
        if min_agents > 0 {
            entry.min_agents = min_agents;
        }
    }

    fn build_zones(&mut self) {
        let mut by_zone: HashMap<ZoneName, Vec<ZoneGroup>> = HashMap::new();
        for info in self.result.agent_group_info.values() {
            by_zone
                .entry(info.zone.clone())
                .or_default()
                .push(ZoneGroup {
                    n: info.num_agents,
                    n_cores: info.num_cores,
                    agent_group: info.name.clone(),
                });
        }
        for (zone, groups) in by_zone {
            self.result.zone_info.insert(zone, ZoneInfo { groups });
        }
    }
}

/// Run the requirements extractor over a parsed document (§4.2).
///
/// Returns `TopologyFailed` only when the walk cannot proceed at all; a
/// document with zero tasks/collections is a legal (if inert) topology.
pub fn extract(doc: &crate::doc::TopologyDocument) -> Result<ExtractedTopology, OdcError> {
    if doc.root.name != ROOT_GROUP && !doc.root.name.is_empty() {
        return Err(OdcError::new(
            ErrorCode::TopologyFailed,
            format!("root group must be named '{ROOT_GROUP}' or left empty, found '{}'", doc.root.name),
        ));
    }
    let mut walker = Walker::new();
    walker.walk_group(&doc.root, "", true);
    walker.build_zones();
    Ok(walker.result)
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
