//! Lakerun CLI
//!
//! Submits a multi-task run described in a JSON file, waits for it to
//! finish and prints the notebook output of each task.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use lakerun_client::{JobsApi, WorkspaceClient};
use lakerun_core::domain::run::{RunId, RunLifeCycleState, RunResult, RunResultState, RunState};
use lakerun_core::dto::run::{AccessControlRequest, GitSource, RunSubmitSettings, RunSubmitTaskSettings};
use lakerun_runner::{Config, LogSink, TracingLogSink, submit_and_wait};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lakerun")]
#[command(about = "Submit Jobs API runs and wait for their outputs", long_about = None)]
struct Cli {
    /// Workspace URL or hostname
    #[arg(long, env = "DATABRICKS_HOST")]
    host: Option<String>,

    /// Workspace access token
    #[arg(long, env = "DATABRICKS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a run and wait for it to complete
    Submit(SubmitArgs),
    /// Show the current state of a run and its tasks
    Status {
        /// Run ID
        run_id: RunId,
    },
}

#[derive(Args)]
struct SubmitArgs {
    /// JSON file with the list of task settings
    #[arg(long)]
    tasks: PathBuf,

    /// Name of the run
    #[arg(long)]
    run_name: Option<String>,

    /// JSON file with the git source of the notebooks
    #[arg(long)]
    git_source: Option<PathBuf>,

    /// Timeout applied to the run by the platform, in seconds
    #[arg(long)]
    timeout_seconds: Option<u64>,

    /// Token making retried submissions return the same run
    #[arg(long, conflicts_with = "generate_idempotency_token")]
    idempotency_token: Option<String>,

    /// Generate a random idempotency token
    #[arg(long)]
    generate_idempotency_token: bool,

    /// JSON file with the access control list
    #[arg(long)]
    acl: Option<PathBuf>,

    /// Maximum number of seconds to wait for the run
    #[arg(long)]
    max_wait_seconds: Option<u64>,

    /// Seconds between two status checks
    #[arg(long)]
    poll_frequency_seconds: Option<u64>,

    /// Print the outputs as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lakerun=info,lakerun_runner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(token) = cli.token {
        config.token = token;
    }

    match cli.command {
        Commands::Submit(args) => submit(config, args).await,
        Commands::Status { run_id } => status(config, run_id).await,
    }
}

/// Builds the workspace client with the configured request timeout
fn build_client(config: &Config) -> Result<WorkspaceClient> {
    config.validate()?;
    let http_client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    Ok(WorkspaceClient::with_client(
        config.host.clone(),
        config.token.clone(),
        http_client,
    ))
}

/// Submit a run and print its task outputs
async fn submit(mut config: Config, args: SubmitArgs) -> Result<()> {
    if let Some(secs) = args.max_wait_seconds {
        config.max_wait = Duration::from_secs(secs);
    }
    if let Some(secs) = args.poll_frequency_seconds {
        config.poll_interval = Duration::from_secs(secs);
    }
    let client = build_client(&config)?;

    let tasks: Vec<RunSubmitTaskSettings> = read_json(&args.tasks)?;
    let mut settings = RunSubmitSettings::new(tasks);
    settings.run_name = args.run_name;
    settings.timeout_seconds = args.timeout_seconds;
    settings.idempotency_token = if args.generate_idempotency_token {
        Some(uuid::Uuid::new_v4().to_string())
    } else {
        args.idempotency_token
    };
    if let Some(path) = &args.git_source {
        settings.git_source = Some(read_json::<GitSource>(path)?);
    }
    if let Some(path) = &args.acl {
        settings.access_control_list = Some(read_json::<Vec<AccessControlRequest>>(path)?);
    }

    info!(
        "Submitting {} task(s) to {} (max wait {:?}, poll every {:?})",
        settings.tasks.len(),
        client.base_url(),
        config.max_wait,
        config.poll_interval
    );

    let api: Arc<dyn JobsApi> = Arc::new(client);
    let sink: Arc<dyn LogSink> = Arc::new(TracingLogSink);
    let outputs = submit_and_wait(api, sink, &settings, config.wait_options()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
    } else {
        print_outputs(&outputs);
    }

    Ok(())
}

/// Print the current state of a run
async fn status(config: Config, run_id: RunId) -> Result<()> {
    let client = build_client(&config)?;
    let run = match client.get_run(run_id).await {
        Ok(run) => run,
        Err(e) if e.is_not_found() => anyhow::bail!("Run {} does not exist", run_id),
        Err(e) => return Err(e).with_context(|| format!("Failed to get run {}", run_id)),
    };

    println!("{}", "Run Details:".bold());
    println!("  ID:       {}", run.run_id.to_string().cyan());
    if let Some(name) = &run.run_name {
        println!("  Name:     {}", name);
    }
    println!("  State:    {}", colorize_state(&run.state));
    if !run.state.state_message.is_empty() {
        println!("  Message:  {}", run.state.state_message.dimmed());
    }
    if let Some(started) = run.started_at() {
        println!("  Started:  {}", started.format("%Y-%m-%d %H:%M:%S"));
        if let Some(ended) = run.ended_at() {
            println!("  Ended:    {}", ended.format("%Y-%m-%d %H:%M:%S"));
            let seconds = ended.signed_duration_since(started).num_seconds();
            println!("  Duration: {}s", seconds);
        }
    }
    if !run.run_page_url.is_empty() {
        println!("  URL:      {}", run.run_page_url.dimmed());
    }

    if !run.tasks.is_empty() {
        println!("\n{}", "Tasks:".bold());
        for task in &run.tasks {
            println!(
                "  {} {} ({}) {}",
                "▸".cyan(),
                task.task_key,
                task.run_id.to_string().dimmed(),
                colorize_state(&task.state)
            );
        }
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Print task outputs sorted by task key
fn print_outputs(outputs: &RunResult) {
    let mut keys: Vec<&String> = outputs.keys().collect();
    keys.sort();

    println!("{}", format!("Outputs of {} task(s):", keys.len()).bold());
    for key in keys {
        let output = &outputs[key];
        let rendered = serde_json::to_string(output).unwrap_or_else(|_| output.to_string());
        println!("  {} {} = {}", "▸".cyan(), key.cyan(), rendered);
    }
}

/// Colorize a run state for display
fn colorize_state(state: &RunState) -> ColoredString {
    let label = match state.result_state {
        Some(result) => format!("{} / {}", state.life_cycle_label(), result),
        None => state.life_cycle_label().to_string(),
    };

    match (state.life_cycle_state, state.result_state) {
        (_, Some(RunResultState::Success)) => label.green(),
        (_, Some(_)) => label.red(),
        (Some(RunLifeCycleState::Skipped | RunLifeCycleState::InternalError), None) => label.red(),
        (Some(RunLifeCycleState::Running | RunLifeCycleState::Terminating), None) => label.cyan(),
        (Some(RunLifeCycleState::Pending | RunLifeCycleState::Queued), None) => label.yellow(),
        _ => label.dimmed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsStr;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_credentials_fall_back_to_environment() {
        let command = Cli::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .map(OsStr::to_os_string)
        };

        assert_eq!(env_of("host").as_deref(), Some(OsStr::new("DATABRICKS_HOST")));
        assert_eq!(env_of("token").as_deref(), Some(OsStr::new("DATABRICKS_TOKEN")));
    }

    #[test]
    fn test_host_flag_overrides_environment() {
        let cli = Cli::try_parse_from([
            "lakerun",
            "--host",
            "https://flag.cloud.databricks.com",
            "status",
            "42",
        ])
        .unwrap();

        assert_eq!(cli.host.as_deref(), Some("https://flag.cloud.databricks.com"));
        assert!(matches!(cli.command, Commands::Status { run_id: 42 }));
    }
}
