// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn dds_submit_params_serde_roundtrip() {
    let params = DdsSubmitParams {
        rms: "localhost".to_string(),
        num_agents: 4,
        min_agents: 2,
        num_slots: 8,
        num_cores: 16,
        config_file: "cfg.json".to_string(),
        env_file: "env.sh".to_string(),
        agent_group: "flp".into(),
    };
    let json = serde_json::to_string(&params).unwrap();
    let back: DdsSubmitParams = serde_json::from_str(&json).unwrap();
    assert_eq!(params, back);
}

#[test]
fn device_command_serde_roundtrip() {
    let cmd = DeviceCommand::SetProperties {
        request_id: 42,
        props: vec![("k1".to_string(), "v1".to_string())],
    };
    let json = serde_json::to_string(&cmd).unwrap();
    let back: DeviceCommand = serde_json::from_str(&json).unwrap();
    assert_eq!(cmd, back);
}

#[test]
fn device_reply_serde_roundtrip() {
    let reply = DeviceReply::TransitionStatus {
        task_id: odc_core::model::TaskId::new(7),
        result: ReplyResult::Failure,
        transition: odc_core::state::Transition::InitDevice,
        current_state: odc_core::state::DeviceState::Error,
    };
    let json = serde_json::to_string(&reply).unwrap();
    let back: DeviceReply = serde_json::from_str(&json).unwrap();
    assert_eq!(reply, back);
}
