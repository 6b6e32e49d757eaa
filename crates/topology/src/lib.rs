// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Topology document model, parsing, and requirements extraction (§3, §4.2).

pub mod doc;
pub mod extract;
pub mod parser;

pub use doc::{CollectionNode, GroupNode, Requirement, TaskNode, TopologyDocument, ROOT_GROUP};
pub use extract::{extract, ExtractedTopology};
pub use parser::{parse_document, resolve_source, Format, ParseError};
