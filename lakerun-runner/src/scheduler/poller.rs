//! Completion poller
//!
//! Polls a submitted run until it reaches a terminal state or the wait budget
//! runs out. Each poll feeds the job and task states to a [`StateTracker`];
//! on success the output of every task is fetched concurrently.

use lakerun_client::JobsApi;
use lakerun_core::domain::log::LogEntry;
use lakerun_core::domain::run::{
    RunId, RunLifeCycleState, RunMetadata, RunResult, RunResultState, TaskRunSummary,
};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::{self, Duration};
use tracing::debug;

use crate::error::{Result, RunError};
use crate::service::{LogSink, StateTracker};

/// Shortest pause between two status queries
pub const MIN_POLL_FREQUENCY: Duration = Duration::from_secs(1);

/// How long to wait for a run and how often to check on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Total wait budget, counted in poll intervals
    pub max_wait: Duration,
    /// Pause between two status queries
    pub poll_frequency: Duration,
}

impl WaitOptions {
    /// Poll frequencies below [`MIN_POLL_FREQUENCY`] are raised to it, so the
    /// wait budget is always used up after a finite number of polls.
    pub fn new(max_wait: Duration, poll_frequency: Duration) -> Self {
        Self {
            max_wait,
            poll_frequency: poll_frequency.max(MIN_POLL_FREQUENCY),
        }
    }

    pub fn from_secs(max_wait_seconds: u64, poll_frequency_seconds: u64) -> Self {
        Self::new(
            Duration::from_secs(max_wait_seconds),
            Duration::from_secs(poll_frequency_seconds),
        )
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::from_secs(900, 10)
    }
}

/// Waits for one run to finish and collects its task outputs
pub struct CompletionPoller {
    api: Arc<dyn JobsApi>,
    sink: Arc<dyn LogSink>,
    options: WaitOptions,
}

impl CompletionPoller {
    /// Creates a new completion poller
    pub fn new(api: Arc<dyn JobsApi>, sink: Arc<dyn LogSink>, options: WaitOptions) -> Self {
        Self { api, sink, options }
    }

    /// Polls `run_id` until it terminates
    ///
    /// Elapsed time is the number of completed waits times the poll frequency;
    /// request latency does not count against the budget. Errors from the
    /// Jobs API end the wait immediately.
    ///
    /// # Arguments
    /// * `run_id` - The run to wait on
    /// * `run_name` - Name used in log lines and errors
    ///
    /// # Returns
    /// Notebook output of every task, keyed by task key
    pub async fn wait_for_completion(&self, run_id: RunId, run_name: &str) -> Result<RunResult> {
        let mut tracker = StateTracker::new(Arc::clone(&self.sink));
        let mut waited = Duration::ZERO;

        debug!(
            "Waiting on run {} (max wait {:?}, poll every {:?})",
            run_id, self.options.max_wait, self.options.poll_frequency
        );

        while waited <= self.options.max_wait {
            let metadata = self.api.get_run(run_id).await?;
            tracker.observe_run(&metadata);

            let terminal = metadata.state.life_cycle_state.filter(|s| s.is_terminal());
            match terminal {
                Some(RunLifeCycleState::Terminated) => {
                    return self.finish(run_id, run_name, metadata).await;
                }
                Some(RunLifeCycleState::Skipped) => {
                    return Err(RunError::JobSkipped {
                        run_name: run_name.to_string(),
                        run_id,
                        state_message: metadata.state.state_message,
                    });
                }
                Some(_) => {
                    return Err(RunError::JobInternalError {
                        run_name: run_name.to_string(),
                        run_id,
                        state_message: metadata.state.state_message,
                    });
                }
                None => {
                    self.sink.record(LogEntry::info(format!(
                        "Waiting for {} seconds.",
                        self.options.poll_frequency.as_secs()
                    )));
                    time::sleep(self.options.poll_frequency).await;
                    waited += self.options.poll_frequency;
                }
            }
        }

        Err(RunError::JobRunTimedOut {
            max_wait_seconds: self.options.max_wait.as_secs(),
            run_name: run_name.to_string(),
            run_id,
        })
    }

    /// Handles a terminated run: outputs on success, an error otherwise
    async fn finish(&self, run_id: RunId, run_name: &str, metadata: RunMetadata) -> Result<RunResult> {
        match metadata.state.result_state {
            Some(RunResultState::Success) => {
                let outputs = self.collect_outputs(&metadata.tasks).await?;
                self.sink.record(LogEntry::info(format!(
                    "Jobs run ({} ID {}) completed successfully!",
                    run_name, run_id
                )));
                Ok(outputs)
            }
            result_state => Err(RunError::JobTerminated {
                run_name: run_name.to_string(),
                run_id,
                result_state,
                state_message: metadata.state.state_message,
            }),
        }
    }

    /// Fetches the output of every task concurrently
    ///
    /// The first failure aborts the remaining fetches.
    async fn collect_outputs(&self, tasks: &[TaskRunSummary]) -> Result<RunResult> {
        let mut fetches = JoinSet::new();
        for task in tasks {
            let api = Arc::clone(&self.api);
            let task_key = task.task_key.clone();
            let task_run_id = task.run_id;
            fetches.spawn(async move {
                let output = api.get_run_output(task_run_id).await?;
                Ok::<_, RunError>((task_key, output.into_notebook_output()))
            });
        }

        let mut outputs = RunResult::with_capacity(tasks.len());
        while let Some(joined) = fetches.join_next().await {
            let (task_key, output) = joined??;
            outputs.insert(task_key, output);
        }

        debug!("Collected output of {} task(s)", outputs.len());
        Ok(outputs)
    }
}
