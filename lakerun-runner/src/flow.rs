//! Submit a run and wait for its task outputs

use lakerun_client::JobsApi;
use lakerun_core::domain::run::RunResult;
use lakerun_core::dto::run::RunSubmitSettings;
use std::sync::Arc;

use crate::error::Result;
use crate::scheduler::{CompletionPoller, WaitOptions};
use crate::service::{LogSink, RunSubmitter};

/// Name the platform gives runs submitted without one
pub const UNTITLED_RUN_NAME: &str = "Untitled";

/// Submits `settings` as a one-time run and waits for it to finish
///
/// # Arguments
/// * `api` - Jobs API used for every request
/// * `sink` - Destination of progress messages
/// * `settings` - The run to create
/// * `options` - Wait budget and poll frequency
///
/// # Returns
/// The notebook output of every task, keyed by task key. Any failure (a
/// rejected submission, a non-successful terminal state, an exhausted wait
/// budget or a failed request) returns an error and no outputs.
pub async fn submit_and_wait(
    api: Arc<dyn JobsApi>,
    sink: Arc<dyn LogSink>,
    settings: &RunSubmitSettings,
    options: WaitOptions,
) -> Result<RunResult> {
    let submitter = RunSubmitter::new(Arc::clone(&api), Arc::clone(&sink));
    let run_id = submitter.submit(settings).await?;

    let run_name = settings.run_name.as_deref().unwrap_or(UNTITLED_RUN_NAME);
    CompletionPoller::new(api, sink, options)
        .wait_for_completion(run_id, run_name)
        .await
}
