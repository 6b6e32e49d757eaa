// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bridges the requirements extractor's static tables (§4.2) to the
//! runtime facts the deployment layer hands back from `activate_topology`
//! (§4.3, §6): which runtime collection a task landed in, which host it
//! runs on, and whether its template was marked expendable.

use odc_core::model::{CollectionDetails, CollectionInfo, CollectionName, RuntimeCollectionId, TaskDetails};
use odc_deploy::TopologyResponseEvent;
use odc_coordinator::ActivatedTask;
use odc_topology::ExtractedTopology;
use std::collections::HashMap;

/// Everything a freshly activated [`crate::session::Session`] needs to hand
/// to a [`odc_coordinator::TopologyCoordinator`] plus the diagnostics a
/// client can ask for via `GetState(detailed=true)`/`Status`.
pub struct Activation {
    pub tasks: Vec<ActivatedTask>,
    pub template_of: HashMap<RuntimeCollectionId, CollectionName>,
    pub collection_info: HashMap<CollectionName, CollectionInfo>,
    pub task_details: Vec<TaskDetails>,
    pub collection_details: Vec<CollectionDetails>,
    pub hosts: Vec<String>,
}

/// Matches each activation event to the collection template whose
/// `topoPath` is its longest containing prefix (a task's path is always
/// `<topoPath>/<taskName>` for a templated collection, `<parentPath>/<name>`
/// for a standalone task, which matches no template).
fn owning_collection<'a>(extracted: &'a ExtractedTopology, path: &str) -> Option<&'a CollectionInfo> {
    extracted
        .collections
        .values()
        .filter(|c| path.starts_with(&format!("{}/", c.topo_path)))
        .max_by_key(|c| c.topo_path.len())
}

pub fn build_activation(extracted: &ExtractedTopology, events: &[TopologyResponseEvent]) -> Activation {
    let mut tasks = Vec::with_capacity(events.len());
    let mut template_of = HashMap::new();
    let mut collection_info: HashMap<CollectionName, CollectionInfo> = HashMap::new();
    let mut task_details = Vec::with_capacity(events.len());
    let mut collection_details: HashMap<RuntimeCollectionId, CollectionDetails> = HashMap::new();
    let mut hosts = Vec::new();

    for event in events {
        if let Some(info) = owning_collection(extracted, &event.path) {
            template_of.entry(event.collection_id).or_insert_with(|| info.name.clone());
            let entry = collection_info.entry(info.name.clone()).or_insert_with(|| info.clone());
            entry.runtime_collection_agents.insert(event.collection_id, event.agent_id);
            collection_details.entry(event.collection_id).or_insert_with(|| CollectionDetails {
                agent_id: event.agent_id,
                collection_id: event.collection_id,
                path: info.topo_path.clone(),
                host: event.host.clone(),
                wrk_dir: event.wrk_dir.clone(),
            });
        }

        task_details.push(TaskDetails {
            agent_id: event.agent_id,
            slot_id: event.slot_id,
            task_id: event.task_id,
            collection_id: event.collection_id,
            path: event.path.clone(),
            host: event.host.clone(),
            wrk_dir: event.wrk_dir.clone(),
            rms_job_id: String::new(),
        });

        if !hosts.contains(&event.host) {
            hosts.push(event.host.clone());
        }

        tasks.push(ActivatedTask {
            task_id: event.task_id,
            collection_id: event.collection_id,
            path: event.path.clone(),
            expendable: extracted.expendable_task_paths.contains(&event.path),
        });
    }

    Activation {
        tasks,
        template_of,
        collection_info,
        task_details,
        collection_details: collection_details.into_values().collect(),
        hosts,
    }
}

#[cfg(test)]
#[path = "activation_tests.rs"]
mod tests;
