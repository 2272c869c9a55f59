//! The Jobs API seam
//!
//! The runner only needs three calls from the platform. Keeping them behind a
//! trait lets the poller run against the HTTP client in production and a
//! scripted fake in tests.

use async_trait::async_trait;
use lakerun_core::domain::run::{RunId, RunMetadata, RunOutput};
use lakerun_core::dto::run::RunSubmitSettings;

use crate::WorkspaceClient;
use crate::error::Result;

/// Operations the runner needs from the Jobs API
#[async_trait]
pub trait JobsApi: Send + Sync {
    /// Creates a one-time run and returns its identifier
    async fn submit_run(&self, settings: &RunSubmitSettings) -> Result<RunId>;

    /// Fetches point-in-time metadata of a run and its tasks
    async fn get_run(&self, run_id: RunId) -> Result<RunMetadata>;

    /// Fetches the output of one task run
    async fn get_run_output(&self, run_id: RunId) -> Result<RunOutput>;
}

#[async_trait]
impl JobsApi for WorkspaceClient {
    async fn submit_run(&self, settings: &RunSubmitSettings) -> Result<RunId> {
        let response = WorkspaceClient::submit_run(self, settings).await?;
        Ok(response.run_id)
    }

    async fn get_run(&self, run_id: RunId) -> Result<RunMetadata> {
        WorkspaceClient::get_run(self, run_id).await
    }

    async fn get_run_output(&self, run_id: RunId) -> Result<RunOutput> {
        WorkspaceClient::get_run_output(self, run_id).await
    }
}
