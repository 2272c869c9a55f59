//! Lakerun HTTP Client
//!
//! A small, type-safe client for the Jobs 2.1 REST API: submitting one-time
//! runs, reading run status and fetching task outputs.
//!
//! The [`JobsApi`] trait is the seam the runner depends on; [`WorkspaceClient`]
//! is its HTTP implementation.
//!
//! # Example
//!
//! ```no_run
//! use lakerun_client::WorkspaceClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = WorkspaceClient::new("https://example.cloud.databricks.com", "dapi-token");
//!
//!     let run = client.get_run(455644833).await?;
//!     println!("Run {} is {}", run.run_id, run.state.life_cycle_label());
//!     Ok(())
//! }
//! ```

mod api;
pub mod error;
mod runs;

// Re-export commonly used types
pub use api::JobsApi;
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for one workspace's Jobs API
///
/// Every request carries the workspace token as a bearer credential.
#[derive(Clone)]
pub struct WorkspaceClient {
    /// Base URL of the workspace (e.g., "https://example.cloud.databricks.com")
    base_url: String,
    /// Personal access token
    token: String,
    /// HTTP client instance
    client: Client,
}

impl std::fmt::Debug for WorkspaceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl WorkspaceClient {
    /// Create a new workspace client
    ///
    /// # Arguments
    /// * `host` - Workspace URL or bare hostname; `https://` is assumed when no scheme is given
    /// * `token` - Access token sent as a bearer credential
    ///
    /// # Example
    /// ```
    /// use lakerun_client::WorkspaceClient;
    ///
    /// let client = WorkspaceClient::new("example.cloud.databricks.com", "dapi-token");
    /// assert_eq!(client.base_url(), "https://example.cloud.databricks.com");
    /// ```
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(host, token, Client::new())
    }

    /// Create a new workspace client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use lakerun_client::WorkspaceClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = WorkspaceClient::with_client("https://example.cloud.databricks.com", "dapi-token", http_client);
    /// ```
    pub fn with_client(host: impl Into<String>, token: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: normalize_host(&host.into()),
            token: token.into(),
            client,
        }
    }

    /// Get the base URL of the workspace
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/2.1/jobs/{}", self.base_url, path)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-success statuses become [`ClientError::NotFound`] (404) or
    /// [`ClientError::ApiError`]; a body that does not decode becomes
    /// [`ClientError::ParseError`].
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ClientError::NotFound(error_text));
            }
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = WorkspaceClient::new("https://example.cloud.databricks.com", "token");
        assert_eq!(client.base_url(), "https://example.cloud.databricks.com");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = WorkspaceClient::new("https://example.cloud.databricks.com/", "token");
        assert_eq!(client.base_url(), "https://example.cloud.databricks.com");
    }

    #[test]
    fn test_client_assumes_https_for_bare_host() {
        let client = WorkspaceClient::new("example.cloud.databricks.com", "token");
        assert_eq!(client.base_url(), "https://example.cloud.databricks.com");

        let client = WorkspaceClient::new("http://localhost:8080", "token");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_endpoint_paths() {
        let client = WorkspaceClient::new("example.cloud.databricks.com", "token");
        assert_eq!(
            client.endpoint("runs/submit"),
            "https://example.cloud.databricks.com/api/2.1/jobs/runs/submit"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = WorkspaceClient::new("example.cloud.databricks.com", "dapi-secret");
        let debug = format!("{:?}", client);
        assert!(!debug.contains("dapi-secret"));
    }
}
