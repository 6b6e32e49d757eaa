// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource-plugin adapter (§4.3): invokes a registered plugin executable
//! to translate a resource description into submission parameters, or
//! synthesises them directly from `agentGroupInfo` when the client opted
//! out of the plugin (`extractTopoResources=true`).

use crate::adapter::{DdsSubmitParams, DeployError};
use odc_core::model::AgentGroupInfo;
use std::collections::HashMap;
use std::time::Duration;

/// Registered `plugin name → executable path` table (§4.3 "a named
/// executable (previously registered under plugin → path)").
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, String>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: impl Into<String>, path: impl Into<String>) {
        self.plugins.insert(plugin.into(), path.into());
    }

    pub fn path(&self, plugin: &str) -> Option<&str> {
        self.plugins.get(plugin).map(String::as_str)
    }
}

/// Invoke `plugin` with `resources` on stdin, returning the
/// `DDSSubmitParams` list parsed from its stdout (§4.3).
pub async fn invoke_plugin(
    registry: &PluginRegistry,
    plugin: &str,
    resources: &str,
    timeout: Duration,
) -> Result<Vec<DdsSubmitParams>, DeployError> {
    let path = registry
        .path(plugin)
        .ok_or_else(|| DeployError::ResourcePluginFailed(format!("unregistered plugin '{plugin}'")))?;

    let output = odc_shell::run(path, &[], None, Some(resources), timeout)
        .await
        .map_err(|e| DeployError::ResourcePluginFailed(e.to_string()))?;

    if !output.success() {
        return Err(DeployError::ResourcePluginFailed(format!(
            "{plugin} exited with {:?}: {}",
            output.exit_code,
            output.stderr.trim()
        )));
    }

    serde_json::from_str(&output.stdout)
        .map_err(|e| DeployError::ResourcePluginFailed(format!("invalid plugin output: {e}")))
}

/// Synthesise submission parameters directly from `agentGroupInfo` without
/// invoking a plugin (§4.3, used when `extractTopoResources=true`).
pub fn synthesize_from_topology(
    agent_groups: &HashMap<odc_core::model::AgentGroupName, AgentGroupInfo>,
    rms: &str,
) -> Vec<DdsSubmitParams> {
    agent_groups
        .values()
        .map(|g| DdsSubmitParams {
            rms: rms.to_string(),
            num_agents: g.num_agents,
            min_agents: g.min_agents,
            num_slots: g.num_slots,
            num_cores: g.num_cores,
            config_file: String::new(),
            env_file: String::new(),
            agent_group: g.name.clone(),
        })
        .collect()
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
