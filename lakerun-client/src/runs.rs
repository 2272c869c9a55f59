//! Run-related API endpoints

use lakerun_core::domain::run::{RunId, RunMetadata, RunOutput};
use lakerun_core::dto::run::{RunSubmitResponse, RunSubmitSettings};
use tracing::debug;

use crate::WorkspaceClient;
use crate::error::Result;

impl WorkspaceClient {
    // =============================================================================
    // Run Lifecycle
    // =============================================================================

    /// Submit a one-time run
    ///
    /// The run is not registered as a job; it only exists as this run. With an
    /// idempotency token, a retried submission returns the id of the run the
    /// first request created.
    ///
    /// # Example
    /// ```no_run
    /// # use lakerun_client::WorkspaceClient;
    /// # use lakerun_core::dto::run::{NotebookTask, RunSubmitSettings, RunSubmitTaskSettings};
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = WorkspaceClient::new("example.cloud.databricks.com", "dapi-token");
    /// let response = client.submit_run(&RunSubmitSettings::new(vec![RunSubmitTaskSettings {
    ///     task_key: "prefect-task".to_string(),
    ///     existing_cluster_id: Some("0923-164208-meows279".to_string()),
    ///     notebook_task: Some(NotebookTask {
    ///         notebook_path: "/Users/user.name@databricks.com/Match".to_string(),
    ///         ..Default::default()
    ///     }),
    ///     ..Default::default()
    /// }])).await?;
    /// println!("Submitted run {}", response.run_id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn submit_run(&self, settings: &RunSubmitSettings) -> Result<RunSubmitResponse> {
        let url = self.endpoint("runs/submit");
        debug!("POST {} ({} task(s))", url, settings.tasks.len());
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(settings)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get the metadata of a run, including the state of each of its tasks
    ///
    /// # Arguments
    /// * `run_id` - The run (or task run) identifier
    pub async fn get_run(&self, run_id: RunId) -> Result<RunMetadata> {
        let url = self.endpoint("runs/get");
        debug!("GET {} (run_id={})", url, run_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("run_id", run_id)])
            .send()
            .await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Run Output
    // =============================================================================

    /// Get the output of a single task run
    ///
    /// Multi-task runs have no output of their own; call this with the run id
    /// of each task.
    ///
    /// # Arguments
    /// * `run_id` - The task run identifier
    pub async fn get_run_output(&self, run_id: RunId) -> Result<RunOutput> {
        let url = self.endpoint("runs/get-output");
        debug!("GET {} (run_id={})", url, run_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("run_id", run_id)])
            .send()
            .await?;

        self.handle_response(response).await
    }
}
