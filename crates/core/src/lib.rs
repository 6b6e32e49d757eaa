// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! odc-core: shared data model for the Online Device Controller partition
//! controller — IDs, device/aggregated state, transitions, the zone/group/
//! collection/task model, and the client request surface.

pub mod clock;
pub mod error;
pub mod id;
pub mod model;
pub mod params;
pub mod state;
pub mod time_fmt;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{ErrorCode, OdcError};
pub use id::{IdGen, OpIdGen, RandomOpIdGen, SequentialIdGen, ShortId, UuidIdGen};
pub use model::{
    AgentGroupInfo, AgentId, CollectionDetails, CollectionInfo, CollectionName,
    DeploymentSessionId, DeviceStatus, PartitionId, RuntimeCollectionId, SlotId, TaskDetails,
    TaskId, TaskInfo, TaskStateDetail, ZoneGroup, ZoneInfo, ZoneName,
};
pub use params::{
    ActivateParams, CommonParams, GetPropertiesParams, InitializeParams, PathParams,
    RequestResult, RunParams, SetPropertiesParams, StatusParams, SubmitParams, TopologySource,
    UpdateParams,
};
pub use state::{AggregatedState, DeviceState, Transition};
pub use time_fmt::{format_elapsed, format_elapsed_ms};
