//! Scripted Jobs API used by the unit tests

use async_trait::async_trait;
use lakerun_client::{ClientError, JobsApi};
use lakerun_core::domain::run::{RunId, RunMetadata, RunOutput, RunState, TaskRunSummary};
use lakerun_core::dto::run::{RunSubmitSettings, RunSubmitTaskSettings};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Jobs API fake that replays a fixed sequence of `runs/get` responses
///
/// The last response repeats once the sequence is exhausted. Task outputs
/// are looked up by task run id; unknown ids answer with `NotFound`.
pub(crate) struct ScriptedApi {
    run_id: RunId,
    submit_error: Option<(u16, String)>,
    submitted: Mutex<Vec<RunSubmitSettings>>,
    responses: Mutex<VecDeque<RunMetadata>>,
    outputs: HashMap<RunId, RunOutput>,
    get_run_calls: AtomicUsize,
    output_calls: AtomicUsize,
}

impl ScriptedApi {
    pub(crate) fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            submit_error: None,
            submitted: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
            outputs: HashMap::new(),
            get_run_calls: AtomicUsize::new(0),
            output_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing_submit(mut self, status: u16, message: &str) -> Self {
        self.submit_error = Some((status, message.to_string()));
        self
    }

    pub(crate) fn with_responses(self, responses: Vec<RunMetadata>) -> Self {
        *self.responses.lock().unwrap() = responses.into();
        self
    }

    pub(crate) fn with_output(mut self, task_run_id: RunId, output: RunOutput) -> Self {
        self.outputs.insert(task_run_id, output);
        self
    }

    pub(crate) fn submitted(&self) -> Vec<RunSubmitSettings> {
        self.submitted.lock().unwrap().clone()
    }

    pub(crate) fn get_run_calls(&self) -> usize {
        self.get_run_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn output_calls(&self) -> usize {
        self.output_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobsApi for ScriptedApi {
    async fn submit_run(&self, settings: &RunSubmitSettings) -> Result<RunId, ClientError> {
        self.submitted.lock().unwrap().push(settings.clone());
        match &self.submit_error {
            Some((status, message)) => Err(ClientError::api_error(*status, message.clone())),
            None => Ok(self.run_id),
        }
    }

    async fn get_run(&self, run_id: RunId) -> Result<RunMetadata, ClientError> {
        self.get_run_calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap();
        let next = if responses.len() > 1 {
            responses.pop_front()
        } else {
            responses.front().cloned()
        };
        next.ok_or_else(|| ClientError::NotFound(format!("run {}", run_id)))
    }

    async fn get_run_output(&self, run_id: RunId) -> Result<RunOutput, ClientError> {
        self.output_calls.fetch_add(1, Ordering::SeqCst);
        self.outputs
            .get(&run_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("output of run {}", run_id)))
    }
}

pub(crate) fn task_settings(task_key: &str) -> RunSubmitTaskSettings {
    RunSubmitTaskSettings {
        task_key: task_key.to_string(),
        existing_cluster_id: Some("0923-164208-meows279".to_string()),
        ..Default::default()
    }
}

pub(crate) fn metadata(run_id: RunId, state: RunState, tasks: Vec<TaskRunSummary>) -> RunMetadata {
    RunMetadata {
        run_id,
        run_name: None,
        run_page_url: format!("https://example.cloud.databricks.com/#job/runs/{}", run_id),
        state,
        tasks,
        start_time: None,
        end_time: None,
    }
}

pub(crate) fn task_run(run_id: RunId, task_key: &str, state: RunState) -> TaskRunSummary {
    TaskRunSummary {
        run_id,
        task_key: task_key.to_string(),
        run_page_url: format!("https://example.cloud.databricks.com/#job/runs/{}", run_id),
        state,
    }
}

pub(crate) fn notebook_output(value: serde_json::Value) -> RunOutput {
    RunOutput {
        notebook_output: Some(value),
        ..Default::default()
    }
}
