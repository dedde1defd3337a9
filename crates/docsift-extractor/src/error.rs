//! Error types for the extraction pipeline

use docsift_schema::{SchemaCompilationError, ValidationFailure};
use thiserror::Error;

/// Errors that fail a single task
///
/// These never abort the request; the task's slot records the error and the
/// next task runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskError {
    /// The task declaration could not be compiled
    #[error("Schema compilation error: {0}")]
    SchemaCompilation(#[from] SchemaCompilationError),

    /// No JSON payload could be located in the backend response
    #[error("Backend output parse error: {0}")]
    BackendOutputParse(String),

    /// The payload violated the contract
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationFailure),

    /// The backend call failed or timed out
    #[error("Backend invocation error: {0}")]
    BackendInvocation(String),

    /// The request was cancelled or hit its deadline
    #[error("Cancelled: {0}")]
    Cancelled(String),
}

impl TaskError {
    /// Stable error kind for the wire response
    pub fn kind(&self) -> &'static str {
        match self {
            TaskError::SchemaCompilation(_) => "SchemaCompilationError",
            TaskError::BackendOutputParse(_) => "BackendOutputParseError",
            TaskError::Validation(_) => "ValidationError",
            TaskError::BackendInvocation(_) => "BackendInvocationError",
            TaskError::Cancelled(_) => "Cancelled",
        }
    }

    /// Field names the error is about
    pub fn fields(&self) -> Vec<String> {
        match self {
            TaskError::SchemaCompilation(e) => e.fields(),
            TaskError::Validation(e) => e.fields(),
            _ => Vec::new(),
        }
    }

    /// Whether another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TaskError::BackendOutputParse(_)
                | TaskError::Validation(_)
                | TaskError::BackendInvocation(_)
        )
    }
}

/// Request-level errors, raised before any task executes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The document is empty or whitespace
    #[error("Document is empty")]
    EmptyDocument,

    /// No tasks were submitted
    #[error("No extraction tasks provided")]
    NoTasks,

    /// A task declares no fields (1-based position)
    #[error("Task {position} declares no fields")]
    TaskWithoutFields {
        /// Position of the task
        position: usize,
    },

    /// The document exceeds the configured length
    #[error("Document too long: {length} chars (max: {max})")]
    DocumentTooLong {
        /// Document length in characters
        length: usize,
        /// Configured maximum
        max: usize,
    },

    /// The normalization stage failed
    #[error("Normalization failed: {0}")]
    Normalization(String),
}
