// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Controller` (§4.1, §6): the fourteen client verbs, the process-wide
//! `partitionID -> Session` map (serialized per partition by holding that
//! partition's mutex for the whole request), restore-file-based startup
//! recovery, and append-only session history.

use crate::activation::build_activation;
use crate::config::ControllerConfig;
use crate::session::{Session, SessionState};
use chrono::Utc;
use odc_core::clock::{Clock, SystemClock};
use odc_core::error::{ErrorCode, OdcError};
use odc_core::id::{OpIdGen, RandomOpIdGen};
use odc_core::model::{DeploymentSessionId, PartitionId, TaskId, TaskStateDetail};
use odc_core::params::{
    ActivateParams, CommonParams, GetPropertiesParams, InitializeParams, PathParams, RequestResult,
    RunParams, SetPropertiesParams, StatusParams, SubmitParams, TopologySource, UpdateParams,
};
use odc_core::state::{AggregatedState, DeviceState, Transition};
use odc_coordinator::{GetPropertiesOutcome, TopologyCoordinator};
use odc_deploy::{DeploymentAdapter, Severity, SubmitEvent};
use odc_storage::{HistoryEntry, RestoreEntry, SessionHistoryLog};
use odc_topology::Format;
use parking_lot::Mutex as SyncMutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex as AsyncMutex;

type SessionHandle<A> = Arc<AsyncMutex<Session<A>>>;
type VerbOutcome = Result<(AggregatedState, Option<String>), OdcError>;

/// One partition's summary row for the `Status` verb (§6). Not a
/// `RequestResult` — status reports on every partition at once, not one
/// request's outcome.
#[derive(Debug, Clone)]
pub struct PartitionStatus {
    pub partition_id: PartitionId,
    pub state: SessionState,
    pub aggregated_state: AggregatedState,
    pub run_nr: u64,
}

/// Owns every partition's [`Session`] and dispatches the client verb
/// surface (§6) against them. Generic over the deployment adapter and, for
/// deterministic timing tests, the clock.
pub struct Controller<A: DeploymentAdapter, C: Clock = SystemClock> {
    deploy: Arc<A>,
    clock: C,
    sessions: SyncMutex<HashMap<PartitionId, SessionHandle<A>>>,
    restore_index: SyncMutex<HashMap<PartitionId, DeploymentSessionId>>,
    plugins: odc_deploy::PluginRegistry,
    history: SessionHistoryLog,
    restore_path: PathBuf,
    op_id_gen: Arc<dyn OpIdGen>,
    default_timeout: Duration,
    heartbeat_interval: Duration,
    subscription_timeout: Duration,
}

impl<A: DeploymentAdapter> Controller<A, SystemClock> {
    pub fn new(deploy: Arc<A>, config: &ControllerConfig) -> Self {
        Self::with_clock(deploy, config, SystemClock)
    }
}

impl<A: DeploymentAdapter, C: Clock> Controller<A, C> {
    pub fn with_clock(deploy: Arc<A>, config: &ControllerConfig, clock: C) -> Self {
        let mut plugins = odc_deploy::PluginRegistry::new();
        for (name, path) in &config.plugins {
            plugins.register(name.clone(), path.clone());
        }
        Self {
            deploy,
            clock,
            sessions: SyncMutex::new(HashMap::new()),
            restore_index: SyncMutex::new(HashMap::new()),
            plugins,
            history: SessionHistoryLog::new(config.history_dir.clone()),
            restore_path: config.restore_file.clone(),
            op_id_gen: Arc::new(RandomOpIdGen),
            default_timeout: config.default_timeout(),
            heartbeat_interval: config.heartbeat_interval(),
            subscription_timeout: config.subscription_timeout(),
        }
    }

    fn session_handle(&self, partition_id: &PartitionId) -> SessionHandle<A> {
        let mut map = self.sessions.lock();
        Arc::clone(
            map.entry(partition_id.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(Session::new(partition_id.clone())))),
        )
    }

    fn current_state(session: &Session<A>, path: &str) -> AggregatedState {
        session.coordinator.as_ref().map(|c| c.aggregate_state(path)).unwrap_or(AggregatedState::Undefined)
    }

    /// Live per-task diagnostics for every non-ignored task matching `path`
    /// (§6 `stateSummaryOnFailure` / `GetState(detailed)`). `target = Some`
    /// restricts the list to tasks that did not reach that device state;
    /// `None` returns all of them (used by `GetState` and `SetProperties`,
    /// which has no single target state).
    fn task_state_details(session: &Session<A>, path: &str, target: Option<DeviceState>) -> Vec<TaskStateDetail> {
        let Some(coordinator) = session.coordinator.as_ref() else {
            return Vec::new();
        };
        let hosts: HashMap<TaskId, String> =
            session.task_details.iter().map(|t| (t.task_id, t.host.clone())).collect();
        coordinator
            .task_states(path)
            .into_iter()
            .filter(|&(_, _, state, ignored)| !ignored && target.map(|t| state != t).unwrap_or(true))
            .map(|(task_id, collection_id, state, _)| TaskStateDetail {
                task_id,
                collection_id,
                state,
                host: hosts.get(&task_id).cloned().unwrap_or_default(),
            })
            .collect()
    }

    /// Attaches [`Self::task_state_details`] to `result` when `gate` is true
    /// and the verb failed; otherwise returns `result` unchanged.
    fn with_failure_detail(
        result: RequestResult,
        session: &Session<A>,
        path: &str,
        gate: bool,
        target: Option<DeviceState>,
    ) -> RequestResult {
        if gate && !result.is_ok() {
            result.with_detailed(Self::task_state_details(session, path, target))
        } else {
            result
        }
    }

    fn elapsed_ms(&self, start: Instant) -> u64 {
        self.clock.now().duration_since(start).as_millis() as u64
    }

    fn record_history(&self, common: &CommonParams, verb: &str, state: AggregatedState) {
        let entry = HistoryEntry {
            ts: Utc::now(),
            partition_id: common.partition_id.clone(),
            verb: verb.to_string(),
            aggregated_state: state,
            run_nr: common.run_nr,
        };
        if let Err(e) = self.history.append(&entry) {
            tracing::warn!(error = %e, "failed to append session history");
        }
    }

    fn save_restore_file(&self) {
        let entries: Vec<RestoreEntry> = self
            .restore_index
            .lock()
            .iter()
            .map(|(p, s)| RestoreEntry { partition_id: p.clone(), session_id: s.clone() })
            .collect();
        if let Err(e) = odc_storage::save_restore_file(&self.restore_path, &entries) {
            tracing::warn!(error = %e, "failed to persist restore file");
        }
    }

    /// Finalizes a state-changing verb call: stamps `exec_time_ms`, records
    /// history on success, and logs failures at a severity keyed off the
    /// taxonomy's fatal class (§7). Read-only queries (`GetState`,
    /// `GetProperties`, `Status`) go through [`Self::finish_readonly`]
    /// instead, since the history log is defined over state changes only.
    fn finish(&self, session: &Session<A>, common: &CommonParams, verb: &str, start: Instant, outcome: VerbOutcome) -> RequestResult {
        let elapsed = self.elapsed_ms(start);
        let result = match outcome {
            Ok((state, dds_id)) => {
                self.record_history(common, verb, state);
                RequestResult::ok(common.partition_id.clone(), common.run_nr, state).with_dds_session_id(dds_id)
            }
            Err(e) => {
                let state = Self::current_state(session, "");
                if e.is_fatal_class() {
                    tracing::error!(code = ?e.code, details = %e.details, partition = %common.partition_id, "{verb} failed fatally");
                } else {
                    tracing::warn!(code = ?e.code, details = %e.details, partition = %common.partition_id, "{verb} failed");
                }
                RequestResult::failed(common.partition_id.clone(), common.run_nr, state, e)
            }
        };
        result.with_exec_time(elapsed).with_hosts(session.hosts.clone())
    }

    /// Same envelope-building as [`Self::finish`] but never touches the
    /// history log — for verbs that only read state.
    fn finish_readonly(&self, session: &Session<A>, common: &CommonParams, start: Instant, outcome: VerbOutcome) -> RequestResult {
        let elapsed = self.elapsed_ms(start);
        let result = match outcome {
            Ok((state, dds_id)) => RequestResult::ok(common.partition_id.clone(), common.run_nr, state).with_dds_session_id(dds_id),
            Err(e) => {
                let state = Self::current_state(session, "");
                tracing::warn!(code = ?e.code, details = %e.details, partition = %common.partition_id, "query failed");
                RequestResult::failed(common.partition_id.clone(), common.run_nr, state, e)
            }
        };
        result.with_exec_time(elapsed).with_hosts(session.hosts.clone())
    }

    /// §4.1 `Initialize`: creates a new deployment session, or attaches to
    /// `params.dds_session_id` when given. Updates the restore index either
    /// way.
    async fn do_initialize(&self, session: &mut Session<A>, common: &CommonParams, params: &InitializeParams) -> Result<String, OdcError> {
        let id = match &params.dds_session_id {
            Some(existing) => self
                .deploy
                .attach_session(existing)
                .await
                .map_err(|e| OdcError::new(ErrorCode::DdsAttachToSessionFailed, e.to_string()))?,
            None => self
                .deploy
                .create_session()
                .await
                .map_err(|e| OdcError::new(ErrorCode::DdsCreateSessionFailed, e.to_string()))?,
        };
        session.deployment_session_id = Some(DeploymentSessionId::new(id.clone()));
        session.state = SessionState::Initialized;
        self.restore_index.lock().insert(common.partition_id.clone(), DeploymentSessionId::new(id.clone()));
        self.save_restore_file();
        Ok(id)
    }

    pub async fn initialize(&self, common: CommonParams, params: InitializeParams) -> RequestResult {
        let start = self.clock.now();
        let handle = self.session_handle(&common.partition_id);
        let mut session = handle.lock().await;
        let outcome = self.initialize_inner(&mut session, &common, &params).await;
        self.finish(&session, &common, "Initialize", start, outcome)
    }

    async fn initialize_inner(&self, session: &mut Session<A>, common: &CommonParams, params: &InitializeParams) -> VerbOutcome {
        session.require_state("Initialize", &[SessionState::Uninitialized])?;
        let id = self.do_initialize(session, common, params).await?;
        Ok((AggregatedState::Undefined, Some(id)))
    }

    async fn submit_and_drain(&self, session_id: &str, params: &[odc_deploy::DdsSubmitParams]) -> Result<(), OdcError> {
        let mut rx = self
            .deploy
            .submit_agents(session_id, params)
            .await
            .map_err(|e| OdcError::new(ErrorCode::DdsSubmitAgentsFailed, e.to_string()))?;
        while let Some(event) = rx.recv().await {
            match event {
                SubmitEvent::Done => break,
                SubmitEvent::Response { severity: Severity::Error, message } => {
                    return Err(OdcError::new(ErrorCode::DdsSubmitAgentsFailed, message));
                }
                SubmitEvent::Response { .. } => {}
            }
        }
        Ok(())
    }

    pub async fn submit(&self, common: CommonParams, params: SubmitParams) -> RequestResult {
        let start = self.clock.now();
        let handle = self.session_handle(&common.partition_id);
        let mut session = handle.lock().await;
        let outcome = self.submit_inner(&mut session, &common, &params).await;
        self.finish(&session, &common, "Submit", start, outcome)
    }

    async fn submit_inner(&self, session: &mut Session<A>, common: &CommonParams, params: &SubmitParams) -> VerbOutcome {
        session.require_state("Submit", &[SessionState::Initialized])?;
        let dds_id = session
            .deployment_session_id
            .clone()
            .ok_or_else(|| OdcError::new(ErrorCode::RequestNotSupported, "session has no deployment session id"))?;
        let submit_params = odc_deploy::invoke_plugin(&self.plugins, &params.plugin, &params.resources, common.timeout)
            .await
            .map_err(|e| OdcError::new(ErrorCode::ResourcePluginFailed, e.to_string()))?;
        self.submit_and_drain(dds_id.as_str(), &submit_params).await?;
        session.state = SessionState::Submitted;
        Ok((AggregatedState::Undefined, None))
    }

    async fn resolve_and_extract(&self, topology: &TopologySource, timeout: Duration) -> Result<(String, Format, odc_topology::ExtractedTopology), OdcError> {
        let (content, format) = odc_topology::resolve_source(topology, timeout).await?;
        let doc = odc_topology::parse_document(&content, format)?;
        let extracted = odc_topology::extract(&doc)?;
        Ok((content, format, extracted))
    }

    /// Writes the resolved topology to a scratch file (the deployment
    /// contract takes a path, not content), activates it, and builds the
    /// coordinator the rest of the session's verbs drive.
    async fn materialize_and_activate(
        &self,
        session: &mut Session<A>,
        common: &CommonParams,
        content: &str,
        format: Format,
        extracted: &odc_topology::ExtractedTopology,
    ) -> Result<AggregatedState, OdcError> {
        let ext = match format {
            Format::Toml => "toml",
            Format::Hcl => "hcl",
            Format::Json => "json",
        };
        let path = std::env::temp_dir().join(format!("odc-topo-{}-{}.{ext}", common.partition_id.as_str(), self.op_id_gen.next_op_id()));
        tokio::fs::write(&path, content).await.map_err(|e| OdcError::new(ErrorCode::TopologyFailed, e.to_string()))?;

        let dds_id = session
            .deployment_session_id
            .clone()
            .ok_or_else(|| OdcError::new(ErrorCode::RequestNotSupported, "session has no deployment session id"))?;
        let events = self.deploy.activate_topology(dds_id.as_str(), &path.to_string_lossy()).await;
        let _ = tokio::fs::remove_file(&path).await;
        let events = events.map_err(|e| OdcError::new(ErrorCode::DdsActivateTopologyFailed, e.to_string()))?;

        let activation = build_activation(extracted, &events);
        let coordinator = TopologyCoordinator::new(
            Arc::clone(&self.deploy),
            dds_id.as_str().to_string(),
            activation.tasks,
            activation.template_of,
            activation.collection_info,
            Arc::clone(&self.op_id_gen),
        );
        coordinator.start(self.heartbeat_interval).await?;
        coordinator.wait_for_subscriptions(self.subscription_timeout).await;
        coordinator.wait_for_state("", None, DeviceState::Idle, common.timeout).await?;

        let state = coordinator.aggregate_state("");
        let hosts = self.query_hosts(dds_id.as_str(), activation.hosts).await;
        session.task_details = activation.task_details;
        session.collection_details = activation.collection_details;
        session.hosts = hosts;
        session.coordinator = Some(coordinator);
        Ok(state)
    }

    /// `RequestResult.hosts` is sourced from the deployment adapter's
    /// `agent_info()` query (§6 "Query active slot counts and agent-info
    /// list"), not re-derived from the activation events; `fallback` (the
    /// per-task hosts `build_activation` already saw) covers an adapter that
    /// can't answer the query. Logs `slot_counts()` alongside for the same
    /// accounting the original exposes.
    async fn query_hosts(&self, session_id: &str, fallback: Vec<String>) -> Vec<String> {
        if let Ok(counts) = self.deploy.slot_counts(session_id).await {
            tracing::debug!(total_slots = counts.total_slots, agent_slots = counts.agent_slots, "slot accounting after activation");
        }
        match self.deploy.agent_info(session_id).await {
            Ok(agents) if !agents.is_empty() => {
                let mut hosts = Vec::with_capacity(agents.len());
                for agent in agents {
                    if !hosts.contains(&agent.host) {
                        hosts.push(agent.host);
                    }
                }
                hosts
            }
            Ok(_) => fallback,
            Err(e) => {
                tracing::warn!(error = %e, "agent_info query failed, falling back to activation hosts");
                fallback
            }
        }
    }

    pub async fn activate(&self, common: CommonParams, params: ActivateParams) -> RequestResult {
        let start = self.clock.now();
        let handle = self.session_handle(&common.partition_id);
        let mut session = handle.lock().await;
        let outcome = self.activate_inner(&mut session, &common, &params).await;
        self.finish(&session, &common, "Activate", start, outcome)
    }

    async fn activate_inner(&self, session: &mut Session<A>, common: &CommonParams, params: &ActivateParams) -> VerbOutcome {
        session.require_state("Activate", &[SessionState::Submitted])?;
        let (content, format, extracted) = self.resolve_and_extract(&params.topology, common.timeout).await?;
        let state = self.materialize_and_activate(session, common, &content, format, &extracted).await?;
        session.state = SessionState::Activated;
        Ok((state, None))
    }

    /// §4.1 `Run`: the atomic `Initialize + Submit + Activate`, refused a
    /// second time on the same partition.
    pub async fn run(&self, common: CommonParams, params: RunParams) -> RequestResult {
        let start = self.clock.now();
        let handle = self.session_handle(&common.partition_id);
        let mut session = handle.lock().await;
        let outcome = self.run_inner(&mut session, &common, &params).await;
        self.finish(&session, &common, "Run", start, outcome)
    }

    async fn run_inner(&self, session: &mut Session<A>, common: &CommonParams, params: &RunParams) -> VerbOutcome {
        if session.run_attempted {
            return Err(OdcError::new(ErrorCode::RequestNotSupported, "Run already attempted on this partition"));
        }
        session.require_state("Run", &[SessionState::Uninitialized])?;
        session.run_attempted = true;

        let dds_id = self.do_initialize(session, common, &InitializeParams::default()).await?;
        let (content, format, extracted) = self.resolve_and_extract(&params.activate.topology, common.timeout).await?;

        let submit_params = if params.extract_topo_resources {
            odc_deploy::synthesize_from_topology(&extracted.agent_group_info, &params.submit.plugin)
        } else {
            odc_deploy::invoke_plugin(&self.plugins, &params.submit.plugin, &params.submit.resources, common.timeout)
                .await
                .map_err(|e| OdcError::new(ErrorCode::ResourcePluginFailed, e.to_string()))?
        };
        self.submit_and_drain(&dds_id, &submit_params).await?;
        session.state = SessionState::Submitted;

        let state = self.materialize_and_activate(session, common, &content, format, &extracted).await?;
        session.state = SessionState::Activated;
        Ok((state, Some(dds_id)))
    }

    /// §4.1 `Update`: only legal once a `Reset` has put the session back in
    /// `Idle` — replaces the activated topology wholesale (resolved Open
    /// Question, see `DESIGN.md`).
    pub async fn update(&self, common: CommonParams, params: UpdateParams) -> RequestResult {
        let start = self.clock.now();
        let handle = self.session_handle(&common.partition_id);
        let mut session = handle.lock().await;
        let outcome = self.update_inner(&mut session, &common, &params).await;
        self.finish(&session, &common, "Update", start, outcome)
    }

    async fn update_inner(&self, session: &mut Session<A>, common: &CommonParams, params: &UpdateParams) -> VerbOutcome {
        session.require_state("Update", &[SessionState::Reset])?;
        let (content, format, extracted) = self.resolve_and_extract(&params.topology, common.timeout).await?;
        if let Some(coordinator) = session.coordinator.take() {
            coordinator.shutdown(Duration::from_secs(5)).await;
        }
        let state = self.materialize_and_activate(session, common, &content, format, &extracted).await?;
        session.state = SessionState::Activated;
        Ok((state, None))
    }

    pub async fn configure(&self, common: CommonParams, params: PathParams) -> RequestResult {
        let start = self.clock.now();
        let handle = self.session_handle(&common.partition_id);
        let session = handle.lock().await;
        let outcome = self.configure_inner(&session, &common, &params).await;
        let result = self.finish(&session, &common, "Configure", start, outcome);
        Self::with_failure_detail(result, &session, &params.path, params.detailed, Some(DeviceState::Ready))
    }

    async fn configure_inner(&self, session: &Session<A>, common: &CommonParams, params: &PathParams) -> VerbOutcome {
        session.require_state("Configure", &[SessionState::Activated])?;
        let coordinator = Arc::clone(session.coordinator()?);
        let state = odc_coordinator::configure(&coordinator, &params.path, common.timeout).await?;
        Ok((state, None))
    }

    pub async fn start(&self, common: CommonParams, params: PathParams) -> RequestResult {
        let start = self.clock.now();
        let handle = self.session_handle(&common.partition_id);
        let mut session = handle.lock().await;
        let outcome = self.start_inner(&mut session, &common, &params).await;
        let result = self.finish(&session, &common, "Start", start, outcome);
        Self::with_failure_detail(result, &session, &params.path, params.detailed, Some(DeviceState::Running))
    }

    async fn start_inner(&self, session: &mut Session<A>, common: &CommonParams, params: &PathParams) -> VerbOutcome {
        session.require_state("Start", &[SessionState::Activated])?;
        let coordinator = Arc::clone(session.coordinator()?);
        let state = coordinator.change_state(&params.path, Transition::Run, common.timeout).await?;
        if params.path.is_empty() {
            session.state = SessionState::Running;
        }
        Ok((state, None))
    }

    pub async fn stop(&self, common: CommonParams, params: PathParams) -> RequestResult {
        let start = self.clock.now();
        let handle = self.session_handle(&common.partition_id);
        let mut session = handle.lock().await;
        let outcome = self.stop_inner(&mut session, &common, &params).await;
        let result = self.finish(&session, &common, "Stop", start, outcome);
        Self::with_failure_detail(result, &session, &params.path, params.detailed, Some(DeviceState::Ready))
    }

    async fn stop_inner(&self, session: &mut Session<A>, common: &CommonParams, params: &PathParams) -> VerbOutcome {
        session.require_state("Stop", &[SessionState::Running])?;
        let coordinator = Arc::clone(session.coordinator()?);
        let state = coordinator.change_state(&params.path, Transition::Stop, common.timeout).await?;
        if params.path.is_empty() {
            session.state = SessionState::Activated;
        }
        Ok((state, None))
    }

    pub async fn reset(&self, common: CommonParams, params: PathParams) -> RequestResult {
        let start = self.clock.now();
        let handle = self.session_handle(&common.partition_id);
        let mut session = handle.lock().await;
        let outcome = self.reset_inner(&mut session, &common, &params).await;
        let result = self.finish(&session, &common, "Reset", start, outcome);
        Self::with_failure_detail(result, &session, &params.path, params.detailed, Some(DeviceState::Idle))
    }

    async fn reset_inner(&self, session: &mut Session<A>, common: &CommonParams, params: &PathParams) -> VerbOutcome {
        session.require_state("Reset", &[SessionState::Activated, SessionState::Running])?;
        let coordinator = Arc::clone(session.coordinator()?);
        let state = odc_coordinator::reset(&coordinator, &params.path, common.timeout).await?;
        if params.path.is_empty() {
            session.state = SessionState::Reset;
        }
        Ok((state, None))
    }

    pub async fn terminate(&self, common: CommonParams, params: PathParams) -> RequestResult {
        let start = self.clock.now();
        let handle = self.session_handle(&common.partition_id);
        let mut session = handle.lock().await;
        let outcome = self.terminate_inner(&mut session, &common, &params).await;
        let result = self.finish(&session, &common, "Terminate", start, outcome);
        Self::with_failure_detail(result, &session, &params.path, params.detailed, Some(DeviceState::Exiting))
    }

    async fn terminate_inner(&self, session: &mut Session<A>, common: &CommonParams, params: &PathParams) -> VerbOutcome {
        session.require_state("Terminate", &[SessionState::Activated, SessionState::Running, SessionState::Reset])?;
        let coordinator = Arc::clone(session.coordinator()?);
        let state = odc_coordinator::terminate(&coordinator, &params.path, common.timeout).await?;
        if params.path.is_empty() {
            session.state = SessionState::Terminated;
        }
        Ok((state, None))
    }

    pub async fn set_properties(&self, common: CommonParams, params: SetPropertiesParams) -> RequestResult {
        let start = self.clock.now();
        let handle = self.session_handle(&common.partition_id);
        let session = handle.lock().await;
        let outcome = self.set_properties_inner(&session, &common, &params).await;
        let result = self.finish(&session, &common, "SetProperties", start, outcome);
        // SetPropertiesParams carries no `detailed` flag (§6); always report
        // per-task state on failure since there's no opt-out.
        Self::with_failure_detail(result, &session, &params.path, true, None)
    }

    async fn set_properties_inner(&self, session: &Session<A>, common: &CommonParams, params: &SetPropertiesParams) -> VerbOutcome {
        session.require_state("SetProperties", &[SessionState::Activated, SessionState::Running])?;
        let coordinator = session.coordinator()?;
        coordinator.set_properties(&params.path, params.props.clone(), common.timeout).await?;
        Ok((Self::current_state(session, &params.path), None))
    }

    /// `GetProperties`: a client-facing complement to `SetProperties` the
    /// verb table doesn't name directly, but the device command vocabulary
    /// (§6) and the `GetProperties` seed scenario both require. Returns the
    /// per-task property map alongside the usual envelope since
    /// `RequestResult` has no generic payload slot.
    pub async fn get_properties(&self, common: CommonParams, params: GetPropertiesParams) -> (RequestResult, HashMap<TaskId, Vec<(String, String)>>) {
        let start = self.clock.now();
        let handle = self.session_handle(&common.partition_id);
        let session = handle.lock().await;
        let outcome = self.get_properties_inner(&session, &common, &params).await;
        let props = match &outcome {
            Ok(o) => o.props.clone(),
            Err(_) => HashMap::new(),
        };
        let state_outcome = outcome.map(|_| (Self::current_state(&session, &params.path), None));
        let result = self.finish_readonly(&session, &common, start, state_outcome);
        (result, props)
    }

    async fn get_properties_inner(&self, session: &Session<A>, common: &CommonParams, params: &GetPropertiesParams) -> Result<GetPropertiesOutcome, OdcError> {
        session.require_state("GetProperties", &[SessionState::Activated, SessionState::Running])?;
        let coordinator = session.coordinator()?;
        coordinator.get_properties(&params.path, &params.query, common.timeout).await
    }

    pub async fn get_state(&self, common: CommonParams, params: PathParams) -> RequestResult {
        let start = self.clock.now();
        let handle = self.session_handle(&common.partition_id);
        let session = handle.lock().await;
        let state = Self::current_state(&session, &params.path);
        let dds_id = session.deployment_session_id.as_ref().map(|id| id.as_str().to_string());
        let mut result = self.finish_readonly(&session, &common, start, Ok((state, dds_id)));
        if params.detailed {
            result = result.with_detailed(Self::task_state_details(&session, &params.path, None));
        }
        result
    }

    async fn do_shutdown(&self, session: &mut Session<A>) -> VerbOutcome {
        if let Some(coordinator) = session.coordinator.take() {
            coordinator.shutdown(Duration::from_secs(5)).await;
        }
        if let Some(id) = session.deployment_session_id.clone() {
            self.deploy
                .shutdown_session(id.as_str())
                .await
                .map_err(|e| OdcError::new(ErrorCode::DdsShutdownSessionFailed, e.to_string()))?;
        }
        session.state = SessionState::Terminated;
        Ok((AggregatedState::Undefined, None))
    }

    pub async fn shutdown(&self, common: CommonParams) -> RequestResult {
        let start = self.clock.now();
        let handle = self.session_handle(&common.partition_id);
        let mut session = handle.lock().await;
        let outcome = self.do_shutdown(&mut session).await;
        let result = self.finish(&session, &common, "Shutdown", start, outcome);
        drop(session);
        self.sessions.lock().remove(&common.partition_id);
        self.restore_index.lock().remove(&common.partition_id);
        self.save_restore_file();
        result
    }

    pub async fn status(&self, params: StatusParams) -> Vec<PartitionStatus> {
        let handles: Vec<(PartitionId, SessionHandle<A>)> = self.sessions.lock().iter().map(|(k, v)| (k.clone(), Arc::clone(v))).collect();
        let mut out = Vec::with_capacity(handles.len());
        for (partition_id, handle) in handles {
            let session = handle.lock().await;
            if params.only_running && session.state != SessionState::Running {
                continue;
            }
            out.push(PartitionStatus {
                partition_id,
                state: session.state,
                aggregated_state: Self::current_state(&session, ""),
                run_nr: session.run_nr,
            });
        }
        out
    }

    /// §4.1 startup recovery: reads the restore file and re-attaches to
    /// every listed session via ordinary `Initialize` calls with attach
    /// semantics. A failed re-attach is logged and skipped, never fatal.
    pub async fn restore(&self) {
        let entries = odc_storage::load_restore_file(&self.restore_path);
        for entry in entries {
            let common = CommonParams::new(entry.partition_id.clone(), 0, self.default_timeout);
            let params = InitializeParams { dds_session_id: Some(entry.session_id.as_str().to_string()) };
            let result = self.initialize(common, params).await;
            if !result.is_ok() {
                tracing::warn!(partition = %entry.partition_id, error = ?result.error, "failed to restore session, continuing");
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
