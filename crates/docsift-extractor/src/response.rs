//! Wire response shared by the server and the CLI

use crate::error::{PipelineError, TaskError};
use crate::types::{AggregatedResult, ExtractionOutcome};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Structured description of a task error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDetail {
    /// Error kind (`ValidationError`, `Cancelled`, ...)
    pub kind: &'static str,
    /// Human-readable message
    pub message: String,
    /// Fields the error is about
    pub fields: Vec<String>,
}

impl From<&TaskError> for ErrorDetail {
    fn from(error: &TaskError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
            fields: error.fields(),
        }
    }
}

/// One `task_N` slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSlot {
    #[serde(skip)]
    position: usize,
    /// Task aim
    pub aim: String,
    /// Validated data; null when the task failed
    pub data: Value,
    /// Error message; null when the task succeeded
    pub error: Option<String>,
    /// Structured error; null when the task succeeded
    pub error_detail: Option<ErrorDetail>,
    /// Backend calls made
    pub attempts: u32,
    /// Tolerated optional-field problems
    pub warnings: Vec<String>,
}

impl From<&ExtractionOutcome> for TaskSlot {
    fn from(outcome: &ExtractionOutcome) -> Self {
        let (data, error, error_detail, warnings) = match &outcome.result {
            Ok(success) => (success.data.clone(), None, None, success.warnings.clone()),
            Err(e) => (
                Value::Null,
                Some(e.to_string()),
                Some(ErrorDetail::from(e)),
                Vec::new(),
            ),
        };

        Self {
            position: outcome.position,
            aim: outcome.aim.clone(),
            data,
            error,
            error_detail,
            attempts: outcome.attempts,
            warnings,
        }
    }
}

/// Position-ordered slots, serialized as `{"task_1": ..., "task_2": ...}`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskResults(pub Vec<TaskSlot>);

impl Serialize for TaskResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for slot in &self.0 {
            map.serialize_entry(&format!("task_{}", slot.position), slot)?;
        }
        map.end()
    }
}

/// Response body for one extraction request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResponse {
    /// `success`, `partial` or `error`
    pub status: &'static str,

    /// Run identifier; absent when the request was rejected before running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,

    /// Tasks that were started
    pub tasks_processed: usize,

    /// Characters in the normalized document
    pub document_length: usize,

    /// Per-task slots; empty for fatal errors
    pub results: TaskResults,

    /// Fatal error message, only when `status` is `error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResponse {
    /// Response for a request rejected before any task ran
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            run_id: None,
            tasks_processed: 0,
            document_length: 0,
            results: TaskResults::default(),
            error: Some(message.into()),
        }
    }

    /// Whether the request failed as a whole
    pub fn is_fatal(&self) -> bool {
        self.status == "error"
    }
}

impl From<&AggregatedResult> for ExtractionResponse {
    fn from(result: &AggregatedResult) -> Self {
        Self {
            status: result.status().as_str(),
            run_id: Some(result.run_id.to_string()),
            tasks_processed: result.tasks_processed,
            document_length: result.document_length,
            results: TaskResults(result.outcomes.iter().map(TaskSlot::from).collect()),
            error: None,
        }
    }
}

impl From<&PipelineError> for ExtractionResponse {
    fn from(error: &PipelineError) -> Self {
        Self::fatal(error.to_string())
    }
}

impl From<Result<AggregatedResult, PipelineError>> for ExtractionResponse {
    fn from(result: Result<AggregatedResult, PipelineError>) -> Self {
        match &result {
            Ok(aggregated) => aggregated.into(),
            Err(e) => e.into(),
        }
    }
}
