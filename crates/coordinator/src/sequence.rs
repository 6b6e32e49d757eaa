// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.7's three canonical run sequences, composed as back-to-back
//! `ChangeState` operations that abort on the first failing step.

use crate::coordinator::TopologyCoordinator;
use odc_core::error::OdcError;
use odc_core::state::{AggregatedState, Transition};
use odc_deploy::DeploymentAdapter;
use std::time::Duration;

/// Runs `sequence` against `path` in order, stopping (and returning the
/// error) at the first transition that fails. Returns the aggregated state
/// after the final transition on success.
pub async fn run_sequence<A: DeploymentAdapter>(
    coordinator: &TopologyCoordinator<A>,
    path: &str,
    sequence: &[Transition],
    per_step_timeout: Duration,
) -> Result<AggregatedState, OdcError> {
    let mut last = coordinator.aggregate_state(path);
    for &transition in sequence {
        last = coordinator.change_state(path, transition, per_step_timeout).await?;
    }
    Ok(last)
}

/// §4.7 `Configure`: `InitDevice, CompleteInit, Bind, Connect, InitTask`.
pub async fn configure<A: DeploymentAdapter>(
    coordinator: &TopologyCoordinator<A>,
    path: &str,
    per_step_timeout: Duration,
) -> Result<AggregatedState, OdcError> {
    run_sequence(coordinator, path, Transition::CONFIGURE_SEQUENCE, per_step_timeout).await
}

/// §4.7 `Reset`: `ResetTask, ResetDevice`.
pub async fn reset<A: DeploymentAdapter>(
    coordinator: &TopologyCoordinator<A>,
    path: &str,
    per_step_timeout: Duration,
) -> Result<AggregatedState, OdcError> {
    run_sequence(coordinator, path, Transition::RESET_SEQUENCE, per_step_timeout).await
}

/// §4.7 `Terminate`: a single `End`.
pub async fn terminate<A: DeploymentAdapter>(
    coordinator: &TopologyCoordinator<A>,
    path: &str,
    per_step_timeout: Duration,
) -> Result<AggregatedState, OdcError> {
    run_sequence(coordinator, path, Transition::TERMINATE_SEQUENCE, per_step_timeout).await
}

#[cfg(test)]
#[path = "sequence_tests.rs"]
mod tests;
