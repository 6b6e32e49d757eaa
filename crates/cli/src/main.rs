// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! odc - command-line client exercising every `Controller` verb directly
//! against a process-local, one-shot instance (§6).
//!
//! Each invocation constructs a fresh [`Controller`], restores any prior
//! deployment sessions from the restore file, runs exactly one verb, and
//! exits. There is no resident daemon: a live `TopologyCoordinator` and its
//! subscription channels do not survive between invocations, only the
//! deployment-session id and the append-only history log do.

mod color;
mod env;
mod output;
mod table;

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use odc_controller::{Controller, ControllerConfig, PartitionStatus};
use odc_core::error::OdcError;
use odc_core::model::PartitionId;
use odc_core::params::{
    ActivateParams, CommonParams, GetPropertiesParams, InitializeParams, PathParams,
    RequestResult, RunParams, SetPropertiesParams, StatusParams, SubmitParams, TopologySource,
};
use odc_deploy::fake::FakeDeploymentAdapter;
use output::OutputFormat;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "odc",
    version,
    disable_version_flag = true,
    about = "Online Device Controller - partition lifecycle and device control"
)]
struct Cli {
    /// Path to a TOML config file (overrides ODC_CONFIG)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<std::path::PathBuf>,

    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// One of `--topo-file`, `--topo-content`, or `--topo-script` (§4.2, §6).
#[derive(clap::Args, Clone)]
struct TopologyArgs {
    #[arg(long = "topo-file", group = "topology")]
    topo_file: Option<String>,
    #[arg(long = "topo-content", group = "topology")]
    topo_content: Option<String>,
    #[arg(long = "topo-script", group = "topology")]
    topo_script: Option<String>,
}

impl TopologyArgs {
    fn into_source(self) -> Result<TopologySource> {
        match (self.topo_file, self.topo_content, self.topo_script) {
            (Some(f), None, None) => Ok(TopologySource::File(f)),
            (None, Some(c), None) => Ok(TopologySource::Content(c)),
            (None, None, Some(s)) => Ok(TopologySource::Script(s)),
            _ => Err(anyhow!(
                "exactly one of --topo-file, --topo-content, --topo-script is required"
            )),
        }
    }
}

#[derive(clap::Args, Clone)]
struct CommonArgs {
    /// Partition to operate on
    #[arg(long)]
    partition: String,
    /// Run number for this request
    #[arg(long, default_value_t = 0)]
    run_nr: u64,
    /// Request timeout in milliseconds
    #[arg(long, default_value_t = 30_000)]
    timeout_ms: u64,
}

impl CommonArgs {
    fn into_params(self) -> CommonParams {
        CommonParams::new(
            PartitionId::new(self.partition),
            self.run_nr,
            Duration::from_millis(self.timeout_ms),
        )
    }
}

#[derive(clap::Args, Clone, Default)]
struct PathArgs {
    /// Device path filter (empty means the whole topology)
    #[arg(long, default_value = "")]
    path: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Attach to or create a deployment session for a partition
    Initialize {
        #[command(flatten)]
        common: CommonArgs,
        /// Attach to an existing deployment session instead of creating one
        #[arg(long)]
        dds_session_id: Option<String>,
    },
    /// Submit agents into the deployment session
    Submit {
        #[command(flatten)]
        common: CommonArgs,
        /// Resource plugin name
        #[arg(long)]
        plugin: String,
        /// Plugin-specific resource description
        #[arg(long, default_value = "")]
        resources: String,
    },
    /// Activate a topology on the submitted agents
    Activate {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        topology: TopologyArgs,
    },
    /// Atomically Initialize + Submit + Activate
    Run {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        topology: TopologyArgs,
        #[arg(long)]
        plugin: String,
        #[arg(long, default_value = "")]
        resources: String,
        /// Derive submission resources from the topology's agent-group demand
        #[arg(long)]
        extract_topo_resources: bool,
    },
    /// Replace the active topology (only legal from the Reset state)
    Update {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        topology: TopologyArgs,
    },
    /// Run the InitDevice -> CompleteInit -> Bind -> Connect -> InitTask sequence
    Configure {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        path: PathArgs,
    },
    Start {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        path: PathArgs,
    },
    Stop {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        path: PathArgs,
    },
    Reset {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        path: PathArgs,
    },
    Terminate {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        path: PathArgs,
    },
    /// Tear down the deployment session entirely
    Shutdown {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Push `key=value` properties down to devices matching a path
    SetProperties {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        path: PathArgs,
        /// Repeatable `key=value` property to set
        #[arg(long = "prop", value_parser = parse_key_value)]
        props: Vec<(String, String)>,
    },
    /// Read properties from devices matching a path
    GetProperties {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        path: PathArgs,
        /// Regex filter applied by the device runtime
        #[arg(long, default_value = "")]
        query: String,
    },
    /// Report the aggregated state of a partition
    GetState {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        path: PathArgs,
        /// Include per-task diagnostics in the response
        #[arg(long)]
        detailed: bool,
    },
    /// List every partition the controller currently knows about
    Status {
        /// Only show partitions whose session is in the Running state
        #[arg(long)]
        only_running: bool,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    Ok((k.to_string(), v.to_string()))
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    init_tracing();

    // `Cli::parse()` can't see the runtime TTY/env check `color::styles()`
    // makes, so build the `Command` by hand to pick up the project palette.
    let matches = Cli::command().styles(color::styles()).get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    let format = cli.output;

    let config = match cli.config.or_else(env::config_path) {
        Some(path) => ControllerConfig::load(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ControllerConfig::default(),
    };

    let controller = Controller::new(Arc::new(FakeDeploymentAdapter::new()), &config);
    controller.restore().await;

    let ok = match cli.command {
        Commands::Initialize {
            common,
            dds_session_id,
        } => {
            let result = controller
                .initialize(common.into_params(), InitializeParams { dds_session_id })
                .await;
            print_result(&result, format);
            result.is_ok()
        }
        Commands::Submit {
            common,
            plugin,
            resources,
        } => {
            let result = controller
                .submit(common.into_params(), SubmitParams { plugin, resources })
                .await;
            print_result(&result, format);
            result.is_ok()
        }
        Commands::Activate { common, topology } => {
            let topology = topology.into_source()?;
            let result = controller
                .activate(common.into_params(), ActivateParams { topology })
                .await;
            print_result(&result, format);
            result.is_ok()
        }
        Commands::Run {
            common,
            topology,
            plugin,
            resources,
            extract_topo_resources,
        } => {
            let topology = topology.into_source()?;
            let result = controller
                .run(
                    common.into_params(),
                    RunParams {
                        submit: SubmitParams { plugin, resources },
                        activate: ActivateParams { topology },
                        extract_topo_resources,
                    },
                )
                .await;
            print_result(&result, format);
            result.is_ok()
        }
        Commands::Update { common, topology } => {
            let topology = topology.into_source()?;
            let result = controller
                .update(common.into_params(), ActivateParams { topology })
                .await;
            print_result(&result, format);
            result.is_ok()
        }
        Commands::Configure { common, path } => {
            let result = controller
                .configure(common.into_params(), path.into_params())
                .await;
            print_result(&result, format);
            result.is_ok()
        }
        Commands::Start { common, path } => {
            let result = controller
                .start(common.into_params(), path.into_params())
                .await;
            print_result(&result, format);
            result.is_ok()
        }
        Commands::Stop { common, path } => {
            let result = controller
                .stop(common.into_params(), path.into_params())
                .await;
            print_result(&result, format);
            result.is_ok()
        }
        Commands::Reset { common, path } => {
            let result = controller
                .reset(common.into_params(), path.into_params())
                .await;
            print_result(&result, format);
            result.is_ok()
        }
        Commands::Terminate { common, path } => {
            let result = controller
                .terminate(common.into_params(), path.into_params())
                .await;
            print_result(&result, format);
            result.is_ok()
        }
        Commands::Shutdown { common } => {
            let result = controller.shutdown(common.into_params()).await;
            print_result(&result, format);
            result.is_ok()
        }
        Commands::SetProperties {
            common,
            path,
            props,
        } => {
            let result = controller
                .set_properties(
                    common.into_params(),
                    SetPropertiesParams {
                        path: path.path,
                        props,
                    },
                )
                .await;
            print_result(&result, format);
            result.is_ok()
        }
        Commands::GetProperties {
            common,
            path,
            query,
        } => {
            let (result, props) = controller
                .get_properties(
                    common.into_params(),
                    GetPropertiesParams {
                        path: path.path,
                        query,
                    },
                )
                .await;
            print_result(&result, format);
            print_properties(&props, format);
            result.is_ok()
        }
        Commands::GetState {
            common,
            path,
            detailed,
        } => {
            let result = controller
                .get_state(
                    common.into_params(),
                    PathParams {
                        path: path.path,
                        detailed,
                    },
                )
                .await;
            print_result(&result, format);
            result.is_ok()
        }
        Commands::Status { only_running } => {
            let statuses = controller.status(StatusParams { only_running }).await;
            print_status_table(&statuses, format);
            true
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

impl PathArgs {
    fn into_params(self) -> PathParams {
        PathParams {
            path: self.path,
            detailed: false,
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = env::log_level()
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_result(result: &RequestResult, format: OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(result) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("failed to serialize result: {e}"),
        },
        OutputFormat::Text => {
            println!(
                "partition={} runNr={} state={} execTimeMs={}",
                result.partition_id.as_str(),
                result.run_nr,
                color::status(&result.aggregated_state.to_string()),
                result.exec_time_ms,
            );
            if let Some(id) = &result.dds_session_id {
                println!("ddsSessionId={id}");
            }
            if !result.hosts.is_empty() {
                println!("hosts={}", result.hosts.join(","));
            }
            if let Some(err) = &result.error {
                print_error(err);
            } else if !result.msg.is_empty() {
                println!("{}", result.msg);
            }
            if let Some(detailed) = &result.detailed {
                for task in detailed {
                    println!(
                        "  task={} collection={} state={} host={}",
                        task.task_id, task.collection_id, task.state, task.host
                    );
                }
            }
        }
    }
}

fn print_error(err: &OdcError) {
    eprintln!("{}", color::red(&format!("{}: {}", err.code, err.details)));
}

fn print_properties(
    props: &std::collections::HashMap<odc_core::model::TaskId, Vec<(String, String)>>,
    format: OutputFormat,
) {
    if props.is_empty() {
        return;
    }
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(props) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("failed to serialize properties: {e}"),
        },
        OutputFormat::Text => {
            for (task_id, kvs) in props {
                for (k, v) in kvs {
                    println!("task={task_id} {k}={v}");
                }
            }
        }
    }
}

fn print_status_table(statuses: &[PartitionStatus], format: OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(
            &statuses
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "partition": s.partition_id.as_str(),
                        "state": format!("{:?}", s.state),
                        "aggregatedState": s.aggregated_state.to_string(),
                        "runNr": s.run_nr,
                    })
                })
                .collect::<Vec<_>>(),
        ) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("failed to serialize status: {e}"),
        },
        OutputFormat::Text => {
            use table::{Column, Table};
            let mut t = Table::new(vec![
                Column::left("PARTITION"),
                Column::left("SESSION"),
                Column::status("STATE"),
                Column::right("RUN_NR"),
            ]);
            for s in statuses {
                t.row(vec![
                    s.partition_id.as_str().to_string(),
                    format!("{:?}", s.state),
                    s.aggregated_state.to_string(),
                    s.run_nr.to_string(),
                ]);
            }
            let mut out = std::io::stdout();
            t.render(&mut out);
        }
    }
}
