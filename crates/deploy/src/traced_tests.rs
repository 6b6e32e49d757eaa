// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::fake::FakeDeploymentAdapter;

#[tokio::test]
async fn traced_adapter_delegates_create_session() {
    let traced = TracedDeploymentAdapter::new(FakeDeploymentAdapter::new());
    let id = traced.create_session().await.unwrap();
    assert!(id.starts_with("fake-session-"));
}

#[tokio::test]
async fn traced_adapter_delegates_shutdown_agent() {
    let traced = TracedDeploymentAdapter::new(FakeDeploymentAdapter::new());
    let id = traced.create_session().await.unwrap();
    let result = traced.shutdown_agent(&id, AgentId::new(1)).await;
    assert!(result.is_ok());
}
