//! Run submission DTOs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

use crate::domain::run::RunId;

/// Body of a one-time run creation request (`runs/submit`)
///
/// Keys in `extra` are sent as additional top-level fields, which lets callers
/// pass options this type does not model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSubmitSettings {
    pub tasks: Vec<RunSubmitTaskSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_source: Option<GitSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    /// At most 64 characters; a retried request with the same token returns
    /// the existing run instead of launching another one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_control_list: Option<Vec<AccessControlRequest>>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl RunSubmitSettings {
    pub fn new(tasks: Vec<RunSubmitTaskSettings>) -> Self {
        Self {
            tasks,
            ..Default::default()
        }
    }

    pub fn with_run_name(mut self, run_name: impl Into<String>) -> Self {
        self.run_name = Some(run_name.into());
        self
    }

    pub fn with_idempotency_token(mut self, token: impl Into<String>) -> Self {
        self.idempotency_token = Some(token.into());
        self
    }

    pub fn with_git_source(mut self, git_source: GitSource) -> Self {
        self.git_source = Some(git_source);
        self
    }

    /// Adds a passthrough field to the request body
    pub fn with_extra(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Settings of one task inside a submitted run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSubmitTaskSettings {
    pub task_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<TaskDependency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_cluster_id: Option<String>,
    /// Cluster specification, passed through as-is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_cluster: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook_task: Option<NotebookTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spark_jar_task: Option<SparkJarTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spark_python_task: Option<SparkPythonTask>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDependency {
    pub task_key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotebookTask {
    pub notebook_path: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub base_parameters: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SparkJarTask {
    pub main_class_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SparkPythonTask {
    pub python_file: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
}

/// Remote repository holding the notebooks of the run
///
/// Only one of `git_branch`, `git_tag` and `git_commit` may be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitSource {
    pub git_url: String,
    /// Hosting service, case insensitive (e.g. "github")
    pub git_provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<String>,
}

impl GitSource {
    /// Number of checkout references (branch, tag, commit) that are set
    pub fn reference_count(&self) -> usize {
        [&self.git_branch, &self.git_tag, &self.git_commit]
            .iter()
            .filter(|r| r.is_some())
            .count()
    }
}

/// Permission granted on the submitted run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessControlRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_principal_name: Option<String>,
    pub permission_level: PermissionLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionLevel {
    CanManage,
    CanManageRun,
    CanView,
    IsOwner,
}

/// Response of `runs/submit`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSubmitResponse {
    pub run_id: RunId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unset_fields_are_omitted() {
        let settings = RunSubmitSettings::new(vec![RunSubmitTaskSettings {
            task_key: "Sessionize".to_string(),
            existing_cluster_id: Some("0923-164208-meows279".to_string()),
            ..Default::default()
        }]);

        let body = serde_json::to_value(&settings).unwrap();
        assert_eq!(
            body,
            json!({
                "tasks": [
                    { "task_key": "Sessionize", "existing_cluster_id": "0923-164208-meows279" }
                ]
            })
        );
    }

    #[test]
    fn test_extra_fields_are_flattened() {
        let settings = RunSubmitSettings::new(vec![])
            .with_run_name("A multitask job run")
            .with_extra("queue", json!({ "enabled": true }));

        let body = serde_json::to_value(&settings).unwrap();
        assert_eq!(body["run_name"], "A multitask job run");
        assert_eq!(body["queue"], json!({ "enabled": true }));
        assert!(body.get("extra").is_none());
    }

    #[test]
    fn test_parse_task_list() {
        let tasks: Vec<RunSubmitTaskSettings> = serde_json::from_value(json!([
            {
                "task_key": "Match",
                "depends_on": [{ "task_key": "Orders_Ingest" }, { "task_key": "Sessionize" }],
                "new_cluster": { "spark_version": "7.3.x-scala2.12", "node_type_id": "i3.xlarge" },
                "notebook_task": {
                    "notebook_path": "/Users/user.name@databricks.com/Match",
                    "base_parameters": { "name": "John Doe", "age": "35" }
                },
                "timeout_seconds": 86400,
                "max_retries": 2
            }
        ]))
        .unwrap();

        let task = &tasks[0];
        assert_eq!(task.depends_on.len(), 2);
        assert_eq!(
            task.notebook_task.as_ref().unwrap().base_parameters["age"],
            "35"
        );
        assert_eq!(task.timeout_seconds, Some(86400));
        assert_eq!(task.extra["max_retries"], json!(2));
    }

    #[test]
    fn test_git_source_reference_count() {
        let mut source = GitSource {
            git_url: "https://github.com/databricks/databricks-cli".to_string(),
            git_provider: "github".to_string(),
            git_branch: Some("main".to_string()),
            ..Default::default()
        };
        assert_eq!(source.reference_count(), 1);

        source.git_tag = Some("release-1.0.0".to_string());
        assert_eq!(source.reference_count(), 2);
    }

    #[test]
    fn test_permission_level_wire_name() {
        let acl = AccessControlRequest {
            user_name: Some("jsmith@example.com".to_string()),
            group_name: None,
            service_principal_name: None,
            permission_level: PermissionLevel::CanManageRun,
        };
        let body = serde_json::to_value(&acl).unwrap();
        assert_eq!(
            body,
            json!({ "user_name": "jsmith@example.com", "permission_level": "CAN_MANAGE_RUN" })
        );
    }
}
