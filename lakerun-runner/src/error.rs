//! Failures of a submitted run
//!
//! Every variant is terminal: the runner never retries on its own, and a
//! failure means no task outputs are returned.

use lakerun_client::ClientError;
use lakerun_core::domain::run::{RunId, RunResultState};
use thiserror::Error;

/// Result type alias for runner operations
pub type Result<T> = std::result::Result<T, RunError>;

/// Why waiting on a run did not produce task outputs
#[derive(Debug, Error)]
pub enum RunError {
    /// The run finished without succeeding
    #[error(
        "Jobs run ({run_name} ID {run_id}) terminated with result state {}: {state_message}",
        result_label(.result_state)
    )]
    JobTerminated {
        run_name: String,
        run_id: RunId,
        result_state: Option<RunResultState>,
        state_message: String,
    },

    /// The platform skipped the run
    #[error("Jobs run ({run_name} ID {run_id}) was skipped: {state_message}.")]
    JobSkipped {
        run_name: String,
        run_id: RunId,
        state_message: String,
    },

    /// The platform failed to run the job
    #[error("Jobs run ({run_name} ID {run_id}) encountered an internal error: {state_message}.")]
    JobInternalError {
        run_name: String,
        run_id: RunId,
        state_message: String,
    },

    /// The run did not reach a terminal state within the wait budget
    #[error(
        "Max wait time of {max_wait_seconds} seconds exceeded while waiting for job run ({run_name} ID {run_id})"
    )]
    JobRunTimedOut {
        max_wait_seconds: u64,
        run_name: String,
        run_id: RunId,
    },

    /// A request to the Jobs API failed; passed through untouched
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A concurrent output fetch panicked or was cancelled
    #[error("Task output fetch did not complete: {0}")]
    OutputFetch(#[from] tokio::task::JoinError),
}

impl RunError {
    /// Identifier of the run this failure is about, when known
    pub fn run_id(&self) -> Option<RunId> {
        match self {
            Self::JobTerminated { run_id, .. }
            | Self::JobSkipped { run_id, .. }
            | Self::JobInternalError { run_id, .. }
            | Self::JobRunTimedOut { run_id, .. } => Some(*run_id),
            Self::Client(_) | Self::OutputFetch(_) => None,
        }
    }
}

fn result_label(result_state: &Option<RunResultState>) -> &'static str {
    result_state.map(|s| s.as_str()).unwrap_or("None")
}
