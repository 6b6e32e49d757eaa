// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory topology document model: a tree of groups containing tasks and
//! collections, each carrying custom key/value requirements. This is the
//! static template the [`crate::extract`] requirements extractor walks;
//! runtime IDs are assigned later, at activation, by the deployment layer.

use serde::{Deserialize, Serialize};

/// A `name = value` custom requirement attached to a task or collection.
///
/// Recognized prefixes (§4.2): `odc_expendable_*`, `odc_zone_*`,
/// `odc_ncores_*`, `odc_nmin_*`, plus the bare key `GroupName`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    pub value: String,
}

impl Requirement {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A single task declaration inside a group or collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNode {
    pub name: String,
    #[serde(default = "one")]
    pub n: u32,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
}

fn one() -> u32 {
    1
}

/// A collection declaration: a named group of co-scheduled tasks with
/// multiplicity `n` (GLOSSARY: Collection).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionNode {
    pub name: String,
    #[serde(default = "one")]
    pub n: u32,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub tasks: Vec<TaskNode>,
}

/// A group node: the root group, or a nested group under it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupNode {
    pub name: String,
    #[serde(default)]
    pub groups: Vec<GroupNode>,
    #[serde(default)]
    pub tasks: Vec<TaskNode>,
    #[serde(default)]
    pub collections: Vec<CollectionNode>,
}

/// Name of the implicit top-level group; tasks/collections directly inside
/// it are "standalone at the root" for the purposes of §4.2 rule 2 ("For
/// every task whose parent is not the root group...").
pub const ROOT_GROUP: &str = "main";

/// A fully parsed topology document (§3, §4.2 input).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyDocument {
    pub root: GroupNode,
}

impl TopologyDocument {
    pub fn new(root: GroupNode) -> Self {
        Self { root }
    }
}

#[cfg(test)]
#[path = "doc_tests.rs"]
mod tests;
