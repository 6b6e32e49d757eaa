// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! The deployment-layer boundary (§1, §6) and the resource-plugin adapter
//! (§4.3). The dynamic-deployment runtime itself is out of scope; this
//! crate types its contract and supplies a fake for the coordinator's
//! tests.

pub mod adapter;
pub mod resource;
pub mod traced;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use adapter::{
    AgentInfo, DdsSubmitParams, DeployError, DeploymentAdapter, DeviceCommand, DeviceReply,
    ReplyResult, Severity, SlotCounts, SubmitEvent, TaskDoneEvent, TopologyResponseEvent,
};
pub use resource::{invoke_plugin, synthesize_from_topology, PluginRegistry};
pub use traced::TracedDeploymentAdapter;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{DeployCall, FakeDeploymentAdapter};
