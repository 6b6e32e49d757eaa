//! Black-box behavioral specifications for the `odc` CLI.
//!
//! These tests invoke the built binary and verify stdout, stderr, and exit
//! codes. The scenario-level invariants from §8 (mixed aggregation, timeout,
//! expendable absorption, quorum enforcement) are exercised at the unit
//! level inside `odc-coordinator`, where a live `TopologyCoordinator`
//! exists for the whole test; see that crate's `coordinator_tests.rs` and
//! `sequence_tests.rs`. This suite covers what only the binary's one-shot
//! process model can show: verb dispatch, exit codes, output formatting,
//! and restore-file continuity across invocations.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/cli/lifecycle.rs"]
mod cli_lifecycle;
