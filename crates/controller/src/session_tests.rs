// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use odc_core::model::PartitionId;
use odc_deploy::fake::FakeDeploymentAdapter;

#[test]
fn new_session_starts_uninitialized() {
    let session: Session<FakeDeploymentAdapter> = Session::new(PartitionId::new("p1"));
    assert_eq!(session.state, SessionState::Uninitialized);
    assert!(!session.run_attempted);
}

#[test]
fn require_state_rejects_wrong_state() {
    let session: Session<FakeDeploymentAdapter> = Session::new(PartitionId::new("p1"));
    let err = session.require_state("Submit", &[SessionState::Initialized]).unwrap_err();
    assert_eq!(err.code, ErrorCode::RequestNotSupported);
}

#[test]
fn require_state_accepts_listed_state() {
    let mut session: Session<FakeDeploymentAdapter> = Session::new(PartitionId::new("p1"));
    session.state = SessionState::Initialized;
    assert!(session.require_state("Submit", &[SessionState::Initialized]).is_ok());
}

#[test]
fn coordinator_missing_is_an_error() {
    let session: Session<FakeDeploymentAdapter> = Session::new(PartitionId::new("p1"));
    assert!(session.coordinator().is_err());
}
