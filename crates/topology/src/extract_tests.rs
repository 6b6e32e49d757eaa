// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::doc::{CollectionNode, GroupNode, Requirement, TaskNode, TopologyDocument};

fn sampler_collection() -> CollectionNode {
    CollectionNode {
        name: "Sampler".to_string(),
        n: 3,
        requirements: vec![
            Requirement::new("GroupName", "flp"),
            Requirement::new("odc_zone_a", "online"),
            Requirement::new("odc_ncores_a", "4"),
            Requirement::new("odc_nmin_a", "2"),
        ],
        tasks: vec![
            TaskNode {
                name: "Reader".to_string(),
                n: 1,
                requirements: vec![Requirement::new("odc_expendable_reader", "true")],
            },
            TaskNode {
                name: "Writer".to_string(),
                n: 1,
                requirements: vec![],
            },
        ],
    }
}

fn doc_with_subgroup() -> TopologyDocument {
    TopologyDocument {
        root: GroupNode {
            name: "main".to_string(),
            groups: vec![GroupNode {
                name: "readout".to_string(),
                collections: vec![sampler_collection()],
                ..Default::default()
            }],
            ..Default::default()
        },
    }
}

#[test]
fn collection_inside_non_root_group_records_nmin() {
    let extracted = extract(&doc_with_subgroup()).unwrap();
    let info = extracted.collections.get("main/readout/Sampler").unwrap();
    assert_eq!(info.n_min, 2);
    assert_eq!(info.n_original, 3);
    assert_eq!(info.n_current, 3);
    assert_eq!(info.n_cores, 4);
    assert_eq!(info.num_tasks, 2);
    assert_eq!(info.total_tasks, 6);
    assert_eq!(info.zone.as_str(), "online");
}

#[test]
fn collection_directly_in_root_group_ignores_nmin() {
    let doc = TopologyDocument {
        root: GroupNode {
            name: "main".to_string(),
            collections: vec![sampler_collection()],
            ..Default::default()
        },
    };
    let extracted = extract(&doc).unwrap();
    let info = extracted.collections.get("main/Sampler").unwrap();
    assert_eq!(info.n_min, -1);
}

#[test]
fn expendable_requirement_marks_template_path() {
    let extracted = extract(&doc_with_subgroup()).unwrap();
    assert!(extracted
        .expendable_task_paths
        .contains("main/readout/Sampler/Reader"));
    assert!(!extracted
        .expendable_task_paths
        .contains("main/readout/Sampler/Writer"));
}

#[test]
fn agent_group_demand_is_aggregated() {
    let extracted = extract(&doc_with_subgroup()).unwrap();
    let group = extracted.agent_group_info.get("flp").unwrap();
    assert_eq!(group.num_agents, 3);
    assert_eq!(group.num_slots, 2);
    assert_eq!(group.num_cores, 4);
    assert_eq!(group.min_agents, 1);
}

#[test]
fn zone_info_groups_agent_groups_by_zone() {
    let extracted = extract(&doc_with_subgroup()).unwrap();
    let zone = extracted.zone_info.get("online").unwrap();
    assert_eq!(zone.groups.len(), 1);
    assert_eq!(zone.groups[0].agent_group.as_str(), "flp");
}

#[test]
fn standalone_task_under_root_is_not_recorded() {
    let doc = TopologyDocument {
        root: GroupNode {
            name: "main".to_string(),
            tasks: vec![TaskNode {
                name: "Foo".to_string(),
                n: 1,
                requirements: vec![],
            }],
            ..Default::default()
        },
    };
    let extracted = extract(&doc).unwrap();
    assert!(extracted.standalone_tasks.is_empty());
}

#[test]
fn standalone_task_under_subgroup_is_recorded() {
    let doc = TopologyDocument {
        root: GroupNode {
            name: "main".to_string(),
            groups: vec![GroupNode {
                name: "epn".to_string(),
                tasks: vec![TaskNode {
                    name: "Merger".to_string(),
                    n: 2,
                    requirements: vec![
                        Requirement::new("GroupName", "epn-group"),
                        Requirement::new("odc_zone_x", "offline"),
                    ],
                }],
                ..Default::default()
            }],
            ..Default::default()
        },
    };
    let extracted = extract(&doc).unwrap();
    let task = extracted.standalone_tasks.get("main/epn/Merger").unwrap();
    assert_eq!(task.n, 2);
    assert_eq!(task.agent_group.as_str(), "epn-group");
    assert_eq!(task.zone.as_str(), "offline");
    assert_eq!(task.topo_parent, "main/epn");
}

#[test]
fn rejects_non_main_root_group_name() {
    let doc = TopologyDocument {
        root: GroupNode {
            name: "bogus".to_string(),
            ..Default::default()
        },
    };
    assert!(extract(&doc).is_err());
}
