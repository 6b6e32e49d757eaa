// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy (§7). Every fallible step in the controller resolves to
//! one of these codes; they are carried verbatim into `RequestResult` for
//! the client rather than collapsed into a generic failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A taxonomy code from §7, surfaced to the client as `{code, details}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Request-shape
    RequestNotSupported,
    TopologyFailed,
    // Deployment
    DdsCreateSessionFailed,
    DdsAttachToSessionFailed,
    DdsSubmitAgentsFailed,
    DdsActivateTopologyFailed,
    DdsCreateTopologyFailed,
    DdsCommanderInfoFailed,
    DdsShutdownSessionFailed,
    DdsSubscribeToSessionFailed,
    ResourcePluginFailed,
    // Device
    FairMqCreateTopologyFailed,
    FairMqChangeStateFailed,
    FairMqWaitForStateFailed,
    FairMqGetStateFailed,
    FairMqSetPropertiesFailed,
    DeviceChangeStateInvalidTransition,
    // Timing
    RequestTimeout,
    OperationTimeout,
    OperationCanceled,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The error carried by a `RequestResult` on failure: a taxonomy code plus a
/// human-readable message (§7 "User-visible failure").
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{code}: {details}")]
pub struct OdcError {
    pub code: ErrorCode,
    pub details: String,
}

impl OdcError {
    pub fn new(code: ErrorCode, details: impl Into<String>) -> Self {
        Self {
            code,
            details: details.into(),
        }
    }

    /// Fatal-class errors are logged line-by-line at fatal severity per §7;
    /// every other error is logged at error severity.
    pub fn is_fatal_class(&self) -> bool {
        matches!(self.code, ErrorCode::TopologyFailed)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
