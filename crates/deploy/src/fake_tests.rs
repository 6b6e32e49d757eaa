// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::adapter::{DeviceCommand, ReplyResult};
use odc_core::model::TaskId;

#[tokio::test]
async fn create_then_attach_reuses_session_id() {
    let adapter = FakeDeploymentAdapter::new();
    let id = adapter.create_session().await.unwrap();
    let attached = adapter.attach_session(&id).await.unwrap();
    assert_eq!(id, attached);
    assert_eq!(adapter.calls().len(), 2);
}

#[tokio::test]
async fn activate_unknown_session_fails() {
    let adapter = FakeDeploymentAdapter::new();
    let err = adapter
        .activate_topology("missing", "topo.toml")
        .await
        .unwrap_err();
    assert!(matches!(err, DeployError::SessionNotFound(_)));
}

#[tokio::test]
async fn activate_returns_configured_plan() {
    let adapter = FakeDeploymentAdapter::new();
    let id = adapter.create_session().await.unwrap();
    let plan = vec![TopologyResponseEvent {
        agent_id: AgentId::new(1),
        slot_id: odc_core::model::SlotId::new(0),
        task_id: TaskId::new(1),
        collection_id: odc_core::model::RuntimeCollectionId::new(1),
        path: "main/Sampler_0/Reader".to_string(),
        host: "node-a".to_string(),
        wrk_dir: "/tmp/wrk".to_string(),
        activated: true,
    }];
    adapter.set_activation_plan(&id, plan.clone());
    let result = adapter.activate_topology(&id, "topo.toml").await.unwrap();
    assert_eq!(result, plan);
}

#[tokio::test]
async fn subscribe_and_push_reply_round_trips() {
    let adapter = FakeDeploymentAdapter::new();
    let id = adapter.create_session().await.unwrap();
    let mut rx = adapter.subscribe_replies(&id).await.unwrap();
    let pushed = adapter
        .push_reply(
            &id,
            DeviceReply::StateChangeSubscription {
                task_id: TaskId::new(1),
                result: ReplyResult::Success,
            },
        )
        .await;
    assert!(pushed);
    let reply = rx.recv().await.unwrap();
    assert!(matches!(reply, DeviceReply::StateChangeSubscription { .. }));
}

#[tokio::test]
async fn push_reply_to_unsubscribed_session_is_noop() {
    let adapter = FakeDeploymentAdapter::new();
    let pushed = adapter
        .push_reply(
            "nobody-subscribed",
            DeviceReply::StateChangeUnsubscription {
                task_id: TaskId::new(1),
                result: ReplyResult::Success,
            },
        )
        .await;
    assert!(!pushed);
}

#[tokio::test]
async fn send_command_is_recorded() {
    let adapter = FakeDeploymentAdapter::new();
    let id = adapter.create_session().await.unwrap();
    adapter
        .send_command(&id, &DeviceCommand::UnsubscribeFromStateChange, Some("main/.*"))
        .await
        .unwrap();
    let calls = adapter.calls();
    assert!(matches!(calls.last(), Some(DeployCall::SendCommand { .. })));
}

#[tokio::test]
async fn shutdown_session_clears_state() {
    let adapter = FakeDeploymentAdapter::new();
    let id = adapter.create_session().await.unwrap();
    adapter.shutdown_session(&id).await.unwrap();
    let err = adapter.activate_topology(&id, "topo.toml").await.unwrap_err();
    assert!(matches!(err, DeployError::SessionNotFound(_)));
}
