//! Runner configuration
//!
//! Workspace connection settings plus the wait budget and poll frequency
//! used while waiting on a run.

use std::time::Duration;

use crate::scheduler::WaitOptions;

/// Runner configuration
#[derive(Clone)]
pub struct Config {
    /// Workspace URL or hostname (e.g., "https://example.cloud.databricks.com")
    pub host: String,

    /// Access token for the workspace
    pub token: String,

    /// How often to query the run status
    pub poll_interval: Duration,

    /// Maximum time to wait for the run to terminate
    pub max_wait: Duration,

    /// Timeout applied to every HTTP request
    pub request_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("token", &"<redacted>")
            .field("poll_interval", &self.poll_interval)
            .field("max_wait", &self.max_wait)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(host: String, token: String) -> Self {
        Self {
            host,
            token,
            poll_interval: Duration::from_secs(10),
            max_wait: Duration::from_secs(900), // 15 minutes
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - DATABRICKS_HOST (checked by `validate`)
    /// - DATABRICKS_TOKEN (checked by `validate`)
    /// - LAKERUN_POLL_FREQUENCY_SECONDS (optional, default: 10)
    /// - LAKERUN_MAX_WAIT_SECONDS (optional, default: 900)
    /// - LAKERUN_REQUEST_TIMEOUT_SECONDS (optional, default: 30)
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("DATABRICKS_HOST").unwrap_or_default();
        let token = std::env::var("DATABRICKS_TOKEN").unwrap_or_default();
        let mut config = Self::new(host, token);

        if let Some(secs) = env_secs("LAKERUN_POLL_FREQUENCY_SECONDS")? {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = env_secs("LAKERUN_MAX_WAIT_SECONDS")? {
            config.max_wait = Duration::from_secs(secs);
        }
        if let Some(secs) = env_secs("LAKERUN_REQUEST_TIMEOUT_SECONDS")? {
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Wait budget and poll frequency for the completion poller
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::new(self.max_wait, self.poll_interval)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.host.trim().is_empty() {
            anyhow::bail!("host cannot be empty (set DATABRICKS_HOST or --host)");
        }

        if self.token.is_empty() {
            anyhow::bail!("token cannot be empty (set DATABRICKS_TOKEN or --token)");
        }

        if self.poll_interval.as_secs() == 0 {
            anyhow::bail!("poll_interval must be at least one second");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

/// Reads an optional whole number of seconds from the environment
fn env_secs(name: &str) -> anyhow::Result<Option<u64>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{} must be a whole number of seconds: {}", name, e)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new(
            "https://example.cloud.databricks.com".to_string(),
            "dapi-token".to_string(),
        )
    }

    #[test]
    fn test_default_values() {
        let config = config();
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.max_wait, Duration::from_secs(900));
        assert_eq!(config.wait_options(), WaitOptions::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = config();

        // Valid config should pass
        assert!(config.validate().is_ok());

        // Missing credentials should fail
        config.token = String::new();
        assert!(config.validate().is_err());

        config.token = "dapi-token".to_string();
        config.host = "  ".to_string();
        assert!(config.validate().is_err());

        config.host = "example.cloud.databricks.com".to_string();
        assert!(config.validate().is_ok());

        // Sub-second polling should fail
        config.poll_interval = Duration::from_millis(500);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_max_wait_is_allowed() {
        let mut config = config();
        config.max_wait = Duration::ZERO;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", config());
        assert!(!debug.contains("dapi-token"));
    }
}
