//! Per-task and per-run result types

use crate::error::TaskError;
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Lifecycle of one task within a run
///
/// `Pending → Compiling → Executing → Succeeded | Failed`. Compilation
/// failures go straight from `Compiling` to `Failed`; tasks cancelled before
/// they start go from `Pending` to `Failed`. Terminal states have no exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Not yet started
    Pending,
    /// Contract being compiled
    Compiling,
    /// Backend attempts in progress
    Executing,
    /// Validated data recorded
    Succeeded,
    /// Error recorded
    Failed,
}

impl TaskState {
    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(self, next: TaskState) -> bool {
        use TaskState::*;
        matches!(
            (self, next),
            (Pending, Compiling)
                | (Pending, Failed)
                | (Compiling, Executing)
                | (Compiling, Failed)
                | (Executing, Succeeded)
                | (Executing, Failed)
        )
    }

    /// Whether the state is final
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Pending => "pending",
            TaskState::Compiling => "compiling",
            TaskState::Executing => "executing",
            TaskState::Succeeded => "succeeded",
            TaskState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Validated data for a successful task
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSuccess {
    /// Object for single-record tasks, array of objects for multi-row tasks
    pub data: Value,

    /// Optional-field values that were replaced by null
    pub warnings: Vec<String>,
}

/// Final outcome of one task
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOutcome {
    /// 1-based position in the submitted task list
    pub position: usize,

    /// Task aim as submitted
    pub aim: String,

    /// Validated data or the error that ended the task
    pub result: Result<TaskSuccess, TaskError>,

    /// Backend calls made for this task
    pub attempts: u32,
}

impl ExtractionOutcome {
    /// Whether the task produced validated data
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Slot key in the response (`task_<position>`)
    pub fn key(&self) -> String {
        format!("task_{}", self.position)
    }
}

/// Overall status of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every task succeeded
    Success,
    /// At least one task failed
    Partial,
}

impl RunStatus {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Partial => "partial",
        }
    }
}

/// Finalized results of a run, one slot per submitted task
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedResult {
    /// Identifier of the run
    pub run_id: Uuid,

    /// Characters in the normalized document
    pub document_length: usize,

    /// Tasks that were started (the rest were cancelled before starting)
    pub tasks_processed: usize,

    /// Outcomes ordered by position
    pub outcomes: Vec<ExtractionOutcome>,
}

impl AggregatedResult {
    /// `Success` only if every slot succeeded
    pub fn status(&self) -> RunStatus {
        if self.outcomes.iter().all(ExtractionOutcome::is_success) {
            RunStatus::Success
        } else {
            RunStatus::Partial
        }
    }

    /// Look up a slot by key (`task_1`, ...)
    pub fn get(&self, key: &str) -> Option<&ExtractionOutcome> {
        let position: usize = key.strip_prefix("task_")?.parse().ok()?;
        self.outcomes.get(position.checked_sub(1)?)
    }

    /// Slot keys in order
    pub fn keys(&self) -> Vec<String> {
        self.outcomes.iter().map(ExtractionOutcome::key).collect()
    }
}
