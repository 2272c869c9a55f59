//! Lakerun Runner
//!
//! Submits a multi-task run to the Jobs API and waits for it to finish.
//!
//! Architecture:
//! - Configuration: workspace connection and wait budget from the environment
//! - Services: run submission, state transition tracking, log sinks
//! - Scheduler: the completion poller that drives a run to a terminal state
//! - Flow: submission followed by the wait, returning per-task outputs
//!
//! ```no_run
//! use std::sync::Arc;
//! use lakerun_client::WorkspaceClient;
//! use lakerun_core::dto::run::{NotebookTask, RunSubmitSettings, RunSubmitTaskSettings};
//! use lakerun_runner::{TracingLogSink, WaitOptions, submit_and_wait};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = WorkspaceClient::new("example.cloud.databricks.com", "dapi-token");
//! let settings = RunSubmitSettings::new(vec![RunSubmitTaskSettings {
//!     task_key: "prefect-task".to_string(),
//!     existing_cluster_id: Some("0923-164208-meows279".to_string()),
//!     notebook_task: Some(NotebookTask {
//!         notebook_path: "/Users/user.name@databricks.com/Match".to_string(),
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! }])
//! .with_run_name("prefect-job");
//!
//! let outputs = submit_and_wait(
//!     Arc::new(client),
//!     Arc::new(TracingLogSink),
//!     &settings,
//!     WaitOptions::default(),
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod flow;
pub mod scheduler;
pub mod service;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{Result, RunError};
pub use flow::{UNTITLED_RUN_NAME, submit_and_wait};
pub use scheduler::{CompletionPoller, WaitOptions};
pub use service::{InMemoryLogSink, LogSink, RunSubmitter, StateTracker, TracingLogSink};
