// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use odc_core::model::{AgentId, CollectionName, SlotId, TaskId, ZoneName};
use std::collections::HashSet;

fn event(task_id: u64, collection_id: u64, path: &str, host: &str) -> TopologyResponseEvent {
    TopologyResponseEvent {
        agent_id: AgentId::new(1),
        slot_id: SlotId::new(task_id),
        task_id: TaskId::new(task_id),
        collection_id: RuntimeCollectionId::new(collection_id),
        path: path.to_string(),
        host: host.to_string(),
        wrk_dir: "/tmp/wrk".to_string(),
        activated: true,
    }
}

fn topology_with_one_collection() -> ExtractedTopology {
    let mut extracted = ExtractedTopology::default();
    extracted.expendable_task_paths.insert("main/Sampler/Processor".to_string());
    extracted.collections.insert(
        "main/Sampler".to_string(),
        CollectionInfo {
            name: CollectionName::from("Sampler"),
            zone: ZoneName::from("online"),
            agent_group: "ag".to_string().into(),
            topo_parent: "main".to_string(),
            topo_path: "main/Sampler".to_string(),
            n_original: 1,
            n_current: 1,
            n_min: -1,
            n_cores: 1,
            num_tasks: 1,
            total_tasks: 1,
            runtime_collection_agents: HashMap::new(),
            failed_runtime_collections: HashSet::new(),
        },
    );
    extracted
}

#[test]
fn task_inside_collection_inherits_expendable_and_template() {
    let extracted = topology_with_one_collection();
    let events = vec![event(1, 10, "main/Sampler/Processor", "node01")];

    let activation = build_activation(&extracted, &events);

    assert_eq!(activation.tasks.len(), 1);
    assert!(activation.tasks[0].expendable);
    assert_eq!(activation.template_of.get(&RuntimeCollectionId::new(10)), Some(&CollectionName::from("Sampler")));
    let info = activation.collection_info.get(&CollectionName::from("Sampler")).unwrap();
    assert_eq!(info.runtime_collection_agents.get(&RuntimeCollectionId::new(10)), Some(&AgentId::new(1)));
    assert_eq!(activation.collection_details.len(), 1);
}

#[test]
fn standalone_task_has_no_owning_collection() {
    let extracted = topology_with_one_collection();
    let events = vec![event(2, 20, "main/Watchdog", "node02")];

    let activation = build_activation(&extracted, &events);

    assert!(activation.template_of.is_empty());
    assert!(activation.collection_info.is_empty());
    assert!(!activation.tasks[0].expendable);
}

#[test]
fn hosts_are_deduplicated() {
    let extracted = topology_with_one_collection();
    let events = vec![
        event(1, 10, "main/Sampler/Processor", "node01"),
        event(2, 11, "main/Sampler/Processor", "node01"),
    ];

    let activation = build_activation(&extracted, &events);
    assert_eq!(activation.hosts, vec!["node01".to_string()]);
}
