// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn transition_expected_state_table_is_bit_exact() {
    assert_eq!(
        Transition::InitDevice.expected_state(),
        DeviceState::InitializingDevice
    );
    assert_eq!(Transition::CompleteInit.expected_state(), DeviceState::Initialized);
    assert_eq!(Transition::Bind.expected_state(), DeviceState::Bound);
    assert_eq!(Transition::Connect.expected_state(), DeviceState::DeviceReady);
    assert_eq!(Transition::InitTask.expected_state(), DeviceState::Ready);
    assert_eq!(Transition::Run.expected_state(), DeviceState::Running);
    assert_eq!(Transition::Stop.expected_state(), DeviceState::Ready);
    assert_eq!(Transition::ResetTask.expected_state(), DeviceState::DeviceReady);
    assert_eq!(Transition::ResetDevice.expected_state(), DeviceState::Idle);
    assert_eq!(Transition::End.expected_state(), DeviceState::Exiting);
}

#[test]
fn configure_sequence_is_canonical() {
    assert_eq!(
        Transition::CONFIGURE_SEQUENCE,
        &[
            Transition::InitDevice,
            Transition::CompleteInit,
            Transition::Bind,
            Transition::Connect,
            Transition::InitTask,
        ]
    );
}

#[test]
fn reset_sequence_is_canonical() {
    assert_eq!(
        Transition::RESET_SEQUENCE,
        &[Transition::ResetTask, Transition::ResetDevice]
    );
}

#[test]
fn terminate_sequence_is_single_end() {
    assert_eq!(Transition::TERMINATE_SEQUENCE, &[Transition::End]);
}

#[test]
fn device_state_converts_into_aggregated_state() {
    let agg: AggregatedState = DeviceState::Running.into();
    assert_eq!(agg, AggregatedState::Running);
}

#[test]
fn aggregated_mixed_has_no_device_state() {
    assert_eq!(AggregatedState::Mixed.as_device_state(), None);
}

#[test]
fn aggregated_concrete_round_trips_to_device_state() {
    let agg: AggregatedState = DeviceState::Idle.into();
    assert_eq!(agg.as_device_state(), Some(DeviceState::Idle));
}

#[test]
fn mixed_display_is_upper_case() {
    assert_eq!(AggregatedState::Mixed.to_string(), "MIXED");
}

#[test]
fn device_state_serde_roundtrip() {
    let json = serde_json::to_string(&DeviceState::Running).unwrap();
    let back: DeviceState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, DeviceState::Running);
}
