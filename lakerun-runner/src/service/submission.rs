//! Submission service
//!
//! Creates the run with exactly one request. Nothing here retries: errors
//! from the API reach the caller as-is, and a caller that wants safe retries
//! supplies an idempotency token.

use lakerun_client::{ClientError, JobsApi};
use lakerun_core::domain::log::LogEntry;
use lakerun_core::domain::run::RunId;
use lakerun_core::dto::run::RunSubmitSettings;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::service::log_sink::LogSink;

/// Longest idempotency token the platform accepts
pub const MAX_IDEMPOTENCY_TOKEN_LEN: usize = 64;

/// Submits one-time runs
pub struct RunSubmitter {
    api: Arc<dyn JobsApi>,
    sink: Arc<dyn LogSink>,
}

impl RunSubmitter {
    /// Creates a new submitter
    ///
    /// # Arguments
    /// * `api` - Jobs API used to create the run
    /// * `sink` - Where the submission is logged
    pub fn new(api: Arc<dyn JobsApi>, sink: Arc<dyn LogSink>) -> Self {
        Self { api, sink }
    }

    /// Validates `settings` and issues a single run creation request
    ///
    /// # Returns
    /// The run id assigned by the platform. With a reused idempotency token
    /// this is the id of the existing run.
    pub async fn submit(&self, settings: &RunSubmitSettings) -> Result<RunId, ClientError> {
        validate_settings(settings)?;

        debug!(
            "Submitting run '{}' with {} task(s)",
            settings.run_name.as_deref().unwrap_or_default(),
            settings.tasks.len()
        );
        let run_id = self.api.submit_run(settings).await?;

        let message = match &settings.idempotency_token {
            Some(token) => format!(
                "Submitted jobs run ({}) as run ID {} with idempotency token '{}'",
                settings.run_name.as_deref().unwrap_or_default(),
                run_id,
                token
            ),
            None => format!(
                "Submitted jobs run ({}) as run ID {}",
                settings.run_name.as_deref().unwrap_or_default(),
                run_id
            ),
        };
        self.sink.record(LogEntry::info(message));

        Ok(run_id)
    }
}

/// Rejects settings the platform would refuse, before any request is made
pub fn validate_settings(settings: &RunSubmitSettings) -> Result<(), ClientError> {
    if let Some(token) = &settings.idempotency_token {
        if token.chars().count() > MAX_IDEMPOTENCY_TOKEN_LEN {
            return Err(ClientError::InvalidRequest(format!(
                "idempotency_token must be at most {} characters",
                MAX_IDEMPOTENCY_TOKEN_LEN
            )));
        }
    }

    if let Some(git_source) = &settings.git_source {
        if git_source.reference_count() > 1 {
            return Err(ClientError::InvalidRequest(
                "git_source accepts only one of git_branch, git_tag or git_commit".to_string(),
            ));
        }
    }

    let mut seen = HashSet::new();
    for task in &settings.tasks {
        if !seen.insert(task.task_key.as_str()) {
            return Err(ClientError::InvalidRequest(format!(
                "duplicate task_key '{}'",
                task.task_key
            )));
        }
    }

    Ok(())
}
