//! Run domain types

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;

/// Identifier the platform assigns to a run or a task run
pub type RunId = i64;

/// Task outputs of a successful run, keyed by task key
pub type RunResult = HashMap<String, JsonValue>;

/// Coarse lifecycle of a run or task run
///
/// Values the platform may add later deserialize to `Unknown` and are treated
/// as non-terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunLifeCycleState {
    Pending,
    Running,
    Terminating,
    Terminated,
    Skipped,
    InternalError,
    Blocked,
    WaitingForRetry,
    Queued,
    #[serde(other)]
    Unknown,
}

impl RunLifeCycleState {
    /// Wire representation of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Terminating => "TERMINATING",
            Self::Terminated => "TERMINATED",
            Self::Skipped => "SKIPPED",
            Self::InternalError => "INTERNAL_ERROR",
            Self::Blocked => "BLOCKED",
            Self::WaitingForRetry => "WAITING_FOR_RETRY",
            Self::Queued => "QUEUED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Whether the run will not change state anymore
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated | Self::Skipped | Self::InternalError)
    }
}

impl fmt::Display for RunLifeCycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a run, only reported once it reaches `TERMINATED`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunResultState {
    Success,
    Failed,
    #[serde(rename = "TIMEDOUT")]
    TimedOut,
    Canceled,
    MaximumConcurrentRunsReached,
    Excluded,
    SuccessWithFailures,
    UpstreamFailed,
    UpstreamCanceled,
    #[serde(other)]
    Unknown,
}

impl RunResultState {
    /// Wire representation of the result
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::TimedOut => "TIMEDOUT",
            Self::Canceled => "CANCELED",
            Self::MaximumConcurrentRunsReached => "MAXIMUM_CONCURRENT_RUNS_REACHED",
            Self::Excluded => "EXCLUDED",
            Self::SuccessWithFailures => "SUCCESS_WITH_FAILURES",
            Self::UpstreamFailed => "UPSTREAM_FAILED",
            Self::UpstreamCanceled => "UPSTREAM_CANCELED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for RunResultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a run or task run at one poll
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_cycle_state: Option<RunLifeCycleState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_state: Option<RunResultState>,
    #[serde(default)]
    pub state_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_cancelled_or_timedout: Option<bool>,
}

impl RunState {
    pub fn new(
        life_cycle_state: RunLifeCycleState,
        result_state: Option<RunResultState>,
        state_message: impl Into<String>,
    ) -> Self {
        Self {
            life_cycle_state: Some(life_cycle_state),
            result_state,
            state_message: state_message.into(),
            user_cancelled_or_timedout: None,
        }
    }

    /// Compares the fields that make up an observable state transition
    ///
    /// Only lifecycle state, result state and message count; any other field
    /// may differ between two snapshots of the same status.
    pub fn same_status(&self, other: &RunState) -> bool {
        self.life_cycle_state == other.life_cycle_state
            && self.result_state == other.result_state
            && self.state_message == other.state_message
    }

    /// Lifecycle state for display, empty when not reported
    pub fn life_cycle_label(&self) -> &'static str {
        self.life_cycle_state.map(|s| s.as_str()).unwrap_or("")
    }

    /// Result state for display, empty when not reported
    pub fn result_label(&self) -> &'static str {
        self.result_state.map(|s| s.as_str()).unwrap_or("")
    }
}

/// Point-in-time metadata of a run, as returned by `runs/get`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: RunId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_name: Option<String>,
    #[serde(default)]
    pub run_page_url: String,
    pub state: RunState,
    #[serde(default)]
    pub tasks: Vec<TaskRunSummary>,
    /// Epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    /// Epoch milliseconds, zero while the run is still active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
}

impl RunMetadata {
    pub fn started_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.start_time
            .filter(|ms| *ms > 0)
            .and_then(chrono::DateTime::from_timestamp_millis)
    }

    pub fn ended_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.end_time
            .filter(|ms| *ms > 0)
            .and_then(chrono::DateTime::from_timestamp_millis)
    }
}

/// Summary of one task run nested in the run metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRunSummary {
    pub run_id: RunId,
    pub task_key: String,
    #[serde(default)]
    pub run_page_url: String,
    #[serde(default)]
    pub state: RunState,
}

/// Output of a single task run, as returned by `runs/get-output`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunOutput {
    /// Opaque notebook result payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook_output: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_trace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonValue>,
}

impl RunOutput {
    /// Takes the notebook output, or an empty object when the task produced none
    pub fn into_notebook_output(self) -> JsonValue {
        self.notebook_output
            .unwrap_or_else(|| JsonValue::Object(serde_json::Map::new()))
    }
}
