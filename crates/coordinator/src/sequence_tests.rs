// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::status::ActivatedTask;
use odc_core::id::RandomOpIdGen;
use odc_core::model::{RuntimeCollectionId, TaskId};
use odc_core::state::DeviceState;
use odc_deploy::fake::FakeDeploymentAdapter;
use odc_deploy::DeviceReply;
use std::collections::HashMap;
use std::sync::Arc;

async fn build_coordinator() -> (Arc<TopologyCoordinator<FakeDeploymentAdapter>>, Arc<FakeDeploymentAdapter>, String) {
    let deploy = Arc::new(FakeDeploymentAdapter::new());
    let session_id = deploy.create_session().await.unwrap();
    let tasks = vec![ActivatedTask {
        task_id: TaskId::new(1),
        collection_id: RuntimeCollectionId::new(0),
        path: "/main/a".to_string(),
        expendable: false,
    }];
    let coordinator = TopologyCoordinator::new(
        Arc::clone(&deploy),
        session_id.clone(),
        tasks,
        HashMap::new(),
        HashMap::new(),
        Arc::new(RandomOpIdGen),
    );
    coordinator.start(Duration::from_secs(3600)).await.unwrap();
    (coordinator, deploy, session_id)
}

#[tokio::test]
async fn configure_runs_all_five_transitions_in_order() {
    let (coordinator, deploy, session_id) = build_coordinator().await;

    let fut = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { configure(&coordinator, "", Duration::from_secs(5)).await })
    };

    for expected in Transition::CONFIGURE_SEQUENCE {
        tokio::task::yield_now().await;
        deploy
            .push_reply(
                &session_id,
                DeviceReply::StateChange {
                    task_id: TaskId::new(1),
                    last_state: DeviceState::Undefined,
                    current_state: expected.expected_state(),
                },
            )
            .await;
    }

    let result = fut.await.unwrap().unwrap();
    assert_eq!(result, AggregatedState::Ready);
}

#[tokio::test(start_paused = true)]
async fn sequence_aborts_on_first_failing_step() {
    let (coordinator, _deploy, _session_id) = build_coordinator().await;

    let err =
        run_sequence(&coordinator, "", &[Transition::InitDevice, Transition::CompleteInit], Duration::from_millis(50))
            .await
            .unwrap_err();
    assert_eq!(err.code, odc_core::error::ErrorCode::OperationTimeout);
}
