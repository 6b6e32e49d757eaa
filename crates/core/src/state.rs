// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Device state machine mirrored from the device runtime (§3), the
//! transition vocabulary that drives it, and the aggregated view the
//! controller exposes to clients (§4.6).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed enumeration mirroring the device runtime's state machine.
///
/// Ordering matches the wire representation used by the device runtime;
/// callers should not rely on discriminant values beyond round-tripping
/// through serde.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceState {
    Undefined,
    Ok,
    Error,
    Idle,
    InitializingDevice,
    Initialized,
    Binding,
    Bound,
    Connecting,
    DeviceReady,
    InitializingTask,
    Ready,
    Running,
    ResettingTask,
    ResettingDevice,
    Exiting,
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// [`DeviceState`] plus a synthetic `Mixed` value produced whenever a set of
/// devices being aggregated over does not share one state (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregatedState {
    Undefined,
    Ok,
    Error,
    Idle,
    InitializingDevice,
    Initialized,
    Binding,
    Bound,
    Connecting,
    DeviceReady,
    InitializingTask,
    Ready,
    Running,
    ResettingTask,
    ResettingDevice,
    Exiting,
    /// Devices matching the requested path are not all in the same state.
    Mixed,
}

impl fmt::Display for AggregatedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if matches!(self, AggregatedState::Mixed) {
            write!(f, "MIXED")
        } else {
            write!(f, "{:?}", self)
        }
    }
}

impl From<DeviceState> for AggregatedState {
    fn from(s: DeviceState) -> Self {
        match s {
            DeviceState::Undefined => AggregatedState::Undefined,
            DeviceState::Ok => AggregatedState::Ok,
            DeviceState::Error => AggregatedState::Error,
            DeviceState::Idle => AggregatedState::Idle,
            DeviceState::InitializingDevice => AggregatedState::InitializingDevice,
            DeviceState::Initialized => AggregatedState::Initialized,
            DeviceState::Binding => AggregatedState::Binding,
            DeviceState::Bound => AggregatedState::Bound,
            DeviceState::Connecting => AggregatedState::Connecting,
            DeviceState::DeviceReady => AggregatedState::DeviceReady,
            DeviceState::InitializingTask => AggregatedState::InitializingTask,
            DeviceState::Ready => AggregatedState::Ready,
            DeviceState::Running => AggregatedState::Running,
            DeviceState::ResettingTask => AggregatedState::ResettingTask,
            DeviceState::ResettingDevice => AggregatedState::ResettingDevice,
            DeviceState::Exiting => AggregatedState::Exiting,
        }
    }
}

impl AggregatedState {
    /// Attempts to narrow a (possibly `Mixed`) aggregated state back down to
    /// a concrete device state. Used only where the caller has already
    /// established every device shares one state.
    pub fn as_device_state(&self) -> Option<DeviceState> {
        Some(match self {
            AggregatedState::Undefined => DeviceState::Undefined,
            AggregatedState::Ok => DeviceState::Ok,
            AggregatedState::Error => DeviceState::Error,
            AggregatedState::Idle => DeviceState::Idle,
            AggregatedState::InitializingDevice => DeviceState::InitializingDevice,
            AggregatedState::Initialized => DeviceState::Initialized,
            AggregatedState::Binding => DeviceState::Binding,
            AggregatedState::Bound => DeviceState::Bound,
            AggregatedState::Connecting => DeviceState::Connecting,
            AggregatedState::DeviceReady => DeviceState::DeviceReady,
            AggregatedState::InitializingTask => DeviceState::InitializingTask,
            AggregatedState::Ready => DeviceState::Ready,
            AggregatedState::Running => DeviceState::Running,
            AggregatedState::ResettingTask => DeviceState::ResettingTask,
            AggregatedState::ResettingDevice => DeviceState::ResettingDevice,
            AggregatedState::Exiting => DeviceState::Exiting,
            AggregatedState::Mixed => return None,
        })
    }
}

/// A requested device-state transition (§3, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transition {
    InitDevice,
    CompleteInit,
    Bind,
    Connect,
    InitTask,
    Run,
    Stop,
    ResetTask,
    ResetDevice,
    End,
}

impl Transition {
    /// The expected post-state of this transition, bit-exact per §6's table.
    pub const fn expected_state(self) -> DeviceState {
        match self {
            Transition::InitDevice => DeviceState::InitializingDevice,
            Transition::CompleteInit => DeviceState::Initialized,
            Transition::Bind => DeviceState::Bound,
            Transition::Connect => DeviceState::DeviceReady,
            Transition::InitTask => DeviceState::Ready,
            Transition::Run => DeviceState::Running,
            Transition::Stop => DeviceState::Ready,
            Transition::ResetTask => DeviceState::DeviceReady,
            Transition::ResetDevice => DeviceState::Idle,
            Transition::End => DeviceState::Exiting,
        }
    }

    /// The canonical `Configure` sequence (§4.7): `InitDevice, CompleteInit, Bind, Connect, InitTask`.
    pub const CONFIGURE_SEQUENCE: &'static [Transition] = &[
        Transition::InitDevice,
        Transition::CompleteInit,
        Transition::Bind,
        Transition::Connect,
        Transition::InitTask,
    ];

    /// The canonical `Reset` sequence (§4.7): `ResetTask, ResetDevice`.
    pub const RESET_SEQUENCE: &'static [Transition] = &[Transition::ResetTask, Transition::ResetDevice];

    /// The canonical `Terminate` sequence (§4.7): a single `End`.
    pub const TERMINATE_SEQUENCE: &'static [Transition] = &[Transition::End];
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
