//! Black-box verb lifecycle specs (§4.1, §4.7): drive the `odc` binary
//! through the client verb surface on a zero-task topology.
//!
//! Each invocation is a fresh, one-shot process (§6, §9): only the
//! deployment-session id (via the restore file) and the history log
//! survive between invocations. A live `TopologyCoordinator` does not, so
//! verbs that require an `Activated` session (`Configure`, `Start`, ...)
//! can only be exercised within the same process as the `Activate`/`Run`
//! that produced it — see `odc-controller`'s own test suite for those.

use crate::prelude::*;

#[test]
fn run_atomically_initializes_submits_and_activates() {
    let p = Partition::new("p1");
    p.odc_for_partition(&[
        "run",
        "--plugin",
        "none",
        "--extract-topo-resources",
        "--topo-content",
        EMPTY_TOPOLOGY,
    ])
    .passes()
    .stdout_has("state=")
    .stdout_has("ddsSessionId=");
}

#[test]
fn submit_with_unregistered_plugin_fails() {
    let p = Partition::new("p1");
    p.odc_for_partition(&["initialize"]).passes();
    p.odc_for_partition(&["submit", "--plugin", "none"])
        .fails()
        .stdout_has("ResourcePluginFailed");
}

#[test]
fn run_is_refused_once_a_session_is_already_initialized() {
    let p = Partition::new("p1");
    p.odc_for_partition(&["initialize"]).passes();
    p.odc_for_partition(&[
        "run",
        "--plugin",
        "none",
        "--extract-topo-resources",
        "--topo-content",
        EMPTY_TOPOLOGY,
    ])
    .fails()
    .stdout_has("RequestNotSupported");
}

#[test]
fn activation_state_does_not_survive_a_fresh_process() {
    let p = Partition::new("p1");
    p.odc_for_partition(&[
        "run",
        "--plugin",
        "none",
        "--extract-topo-resources",
        "--topo-content",
        EMPTY_TOPOLOGY,
    ])
    .passes();

    // The deployment session id is carried forward via the restore file,
    // so `initialize` re-attaches, but the `TopologyCoordinator` that
    // `Activate` built is gone. `Configure` therefore sees an Initialized
    // session, not an Activated one.
    p.odc_for_partition(&["configure"])
        .fails()
        .stdout_has("RequestNotSupported");
}

#[test]
fn start_before_activate_is_rejected() {
    let p = Partition::new("p1");
    p.odc_for_partition(&["initialize"]).passes();
    p.odc_for_partition(&["start"])
        .fails()
        .stdout_has("RequestNotSupported");
}

#[test]
fn get_state_reports_undefined_before_any_session_exists() {
    let p = Partition::new("p1");
    p.odc_for_partition(&["get-state"])
        .passes()
        .stdout_has("state=Undefined");
}

#[test]
fn shutdown_clears_the_restore_entry_so_a_later_initialize_starts_fresh() {
    let p = Partition::new("p1");
    p.odc_for_partition(&["initialize"]).passes();
    p.odc_for_partition(&["shutdown"]).passes();

    // No restore entry left — `submit` on an uninitialized session is rejected.
    p.odc_for_partition(&["submit", "--plugin", "none"])
        .fails()
        .stdout_has("RequestNotSupported");
}

#[test]
fn status_lists_every_known_partition() {
    let p1 = Partition::new("p1");
    p1.odc_for_partition(&["initialize"]).passes();

    p1.odc()
        .args(&["--partition", "p1", "status"])
        .passes()
        .stdout_has("p1");
}

#[test]
fn json_output_is_valid_json() {
    let p = Partition::new("p1");
    let out = p
        .odc_for_partition(&["initialize"])
        .args(&["--output", "json"])
        .passes();
    let stdout = out.stdout();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert!(parsed.get("partition_id").is_some());
}
