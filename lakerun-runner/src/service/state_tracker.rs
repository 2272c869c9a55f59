//! State tracker
//!
//! Remembers the last observed state of the job run and of each task run,
//! and logs a line only when an observation differs from the previous one.
//! Job runs and task runs are kept in separate histories, so the same id may
//! appear in both without interfering.

use lakerun_core::domain::log::LogEntry;
use lakerun_core::domain::run::{RunId, RunMetadata, RunState};
use std::collections::HashMap;
use std::sync::Arc;

use crate::service::log_sink::LogSink;

/// Last observation of one run id
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub run_page_url: String,
    pub run_id: RunId,
    pub state: RunState,
}

/// Last observed snapshot per run id
///
/// Lives for one wait on one run; entries are only ever overwritten.
#[derive(Debug, Default)]
pub struct StateHistory {
    entries: HashMap<String, StateSnapshot>,
}

impl StateHistory {
    pub fn get(&self, run_id: RunId) -> Option<&StateSnapshot> {
        self.entries.get(&run_id.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores `snapshot` as the latest observation of its run id
    ///
    /// Returns true when there was no previous observation or when its
    /// status differs. The snapshot is stored either way.
    fn record(&mut self, snapshot: StateSnapshot) -> bool {
        let key = snapshot.run_id.to_string();
        let changed = self
            .entries
            .get(&key)
            .is_none_or(|previous| !previous.state.same_status(&snapshot.state));
        self.entries.insert(key, snapshot);
        changed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunScope {
    Job,
    Task,
}

impl RunScope {
    fn label(&self) -> &'static str {
        match self {
            RunScope::Job => "Job",
            RunScope::Task => "Task",
        }
    }
}

/// Tracks job and task state across polls and logs transitions
pub struct StateTracker {
    jobs: StateHistory,
    tasks: StateHistory,
    sink: Arc<dyn LogSink>,
}

impl StateTracker {
    /// Creates a tracker with empty histories
    ///
    /// # Arguments
    /// * `sink` - Where transition lines are written
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            jobs: StateHistory::default(),
            tasks: StateHistory::default(),
            sink,
        }
    }

    /// Records the job run state, returning whether it transitioned
    pub fn observe_job(&mut self, run_id: RunId, run_page_url: &str, state: &RunState) -> bool {
        self.observe(RunScope::Job, run_id, run_page_url, state)
    }

    /// Records a task run state, returning whether it transitioned
    pub fn observe_task(&mut self, run_id: RunId, run_page_url: &str, state: &RunState) -> bool {
        self.observe(RunScope::Task, run_id, run_page_url, state)
    }

    /// Records the job state and the state of every task in `metadata`
    ///
    /// Returns the number of transitions logged.
    pub fn observe_run(&mut self, metadata: &RunMetadata) -> usize {
        let mut transitions = 0;
        if self.observe_job(metadata.run_id, &metadata.run_page_url, &metadata.state) {
            transitions += 1;
        }
        for task in &metadata.tasks {
            if self.observe_task(task.run_id, &task.run_page_url, &task.state) {
                transitions += 1;
            }
        }
        transitions
    }

    pub fn jobs(&self) -> &StateHistory {
        &self.jobs
    }

    pub fn tasks(&self) -> &StateHistory {
        &self.tasks
    }

    fn observe(
        &mut self,
        scope: RunScope,
        run_id: RunId,
        run_page_url: &str,
        state: &RunState,
    ) -> bool {
        let history = match scope {
            RunScope::Job => &mut self.jobs,
            RunScope::Task => &mut self.tasks,
        };

        let changed = history.record(StateSnapshot {
            run_page_url: run_page_url.to_string(),
            run_id,
            state: state.clone(),
        });

        if changed {
            self.sink.record(LogEntry::info(format!(
                "{} Run '{}' transitioned state. '{}', '{}' with message '{}':  {}",
                scope.label(),
                run_id,
                state.life_cycle_label(),
                state.result_label(),
                state.state_message,
                run_page_url
            )));
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::log_sink::InMemoryLogSink;
    use lakerun_core::domain::run::{RunLifeCycleState, RunResultState, TaskRunSummary};

    fn tracker() -> (StateTracker, InMemoryLogSink) {
        let sink = InMemoryLogSink::new();
        (StateTracker::new(Arc::new(sink.clone())), sink)
    }

    fn running(message: &str) -> RunState {
        RunState::new(RunLifeCycleState::Running, None, message)
    }

    #[test]
    fn test_first_observation_always_logs() {
        let (mut tracker, sink) = tracker();

        assert!(tracker.observe_job(1, "https://ui/run/1", &RunState::default()));

        assert_eq!(
            sink.messages(),
            vec!["Job Run '1' transitioned state. '', '' with message '':  https://ui/run/1"]
        );
    }

    #[test]
    fn test_unchanged_state_is_not_logged_but_stored() {
        let (mut tracker, sink) = tracker();

        assert!(tracker.observe_job(1, "https://ui/run/1", &running("In run")));
        assert!(!tracker.observe_job(1, "https://ui/run/1?o=2", &running("In run")));

        assert_eq!(sink.messages().len(), 1);
        let stored = tracker.jobs().get(1).unwrap();
        assert_eq!(stored.run_page_url, "https://ui/run/1?o=2");
    }

    #[test]
    fn test_each_status_field_triggers_transition() {
        let (mut tracker, sink) = tracker();

        tracker.observe_task(5, "", &running("In run"));
        assert!(tracker.observe_task(5, "", &running("Waiting for cluster")));
        assert!(tracker.observe_task(
            5,
            "",
            &RunState::new(RunLifeCycleState::Terminated, None, "Waiting for cluster")
        ));
        assert!(tracker.observe_task(
            5,
            "",
            &RunState::new(
                RunLifeCycleState::Terminated,
                Some(RunResultState::Success),
                "Waiting for cluster"
            )
        ));

        assert_eq!(sink.messages().len(), 4);
        assert!(
            sink.messages()[3]
                .starts_with("Task Run '5' transitioned state. 'TERMINATED', 'SUCCESS'")
        );
    }

    #[test]
    fn test_job_and_task_histories_are_independent() {
        let (mut tracker, sink) = tracker();

        assert!(tracker.observe_job(9, "", &running("")));
        assert!(tracker.observe_task(9, "", &running("")));

        assert_eq!(tracker.jobs().len(), 1);
        assert_eq!(tracker.tasks().len(), 1);
        let messages = sink.messages();
        assert!(messages[0].starts_with("Job Run '9'"));
        assert!(messages[1].starts_with("Task Run '9'"));
    }

    #[test]
    fn test_observe_run_covers_job_and_tasks() {
        let (mut tracker, sink) = tracker();
        let metadata = RunMetadata {
            run_id: 1,
            run_name: None,
            run_page_url: String::new(),
            state: running(""),
            tasks: vec![
                TaskRunSummary {
                    run_id: 2,
                    task_key: "A".to_string(),
                    run_page_url: String::new(),
                    state: running(""),
                },
                TaskRunSummary {
                    run_id: 3,
                    task_key: "B".to_string(),
                    run_page_url: String::new(),
                    state: RunState::default(),
                },
            ],
            start_time: None,
            end_time: None,
        };

        assert_eq!(tracker.observe_run(&metadata), 3);
        assert_eq!(tracker.observe_run(&metadata), 0);
        assert_eq!(sink.messages().len(), 3);
        assert!(tracker.tasks().get(3).is_some());
    }
}
