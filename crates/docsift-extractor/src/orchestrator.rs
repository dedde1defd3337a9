//! Task orchestration

use crate::aggregator::ResultAggregator;
use crate::config::ExtractorConfig;
use crate::error::{PipelineError, TaskError};
use crate::executor::{Executor, RunContext};
use crate::types::{AggregatedResult, ExtractionOutcome, TaskState};
use docsift_domain::{Document, DocumentNormalizer, ExtractionBackend, ExtractionTask};
use docsift_schema::SchemaCompiler;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Runs extraction tasks in order against one document
///
/// Holds only immutable state, so one orchestrator serves concurrent
/// requests. Each run is request-scoped.
pub struct Orchestrator<B> {
    backend: Arc<B>,
    compiler: SchemaCompiler,
    config: ExtractorConfig,
}

impl<B> Orchestrator<B>
where
    B: ExtractionBackend,
{
    /// Create a new orchestrator
    pub fn new(backend: B, config: ExtractorConfig) -> Self {
        Self::from_arc(Arc::new(backend), config)
    }

    /// Create an orchestrator over a shared backend
    pub fn from_arc(backend: Arc<B>, config: ExtractorConfig) -> Self {
        let compiler = SchemaCompiler::new().with_preamble(config.instruction_preamble.clone());
        Self {
            backend,
            compiler,
            config,
        }
    }

    /// The backend in use
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The pipeline configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Run every task against already-normalized text
    pub async fn run(
        &self,
        tasks: &[ExtractionTask],
        document_text: &str,
    ) -> Result<AggregatedResult, PipelineError> {
        self.run_with_cancel(tasks, document_text, CancellationToken::new())
            .await
    }

    /// Normalize a document, then run every task against the result
    pub async fn run_document<N>(
        &self,
        normalizer: &N,
        document: &Document,
        tasks: &[ExtractionTask],
        cancel: CancellationToken,
    ) -> Result<AggregatedResult, PipelineError>
    where
        N: DocumentNormalizer,
    {
        let text = normalizer
            .normalize(document)
            .map_err(|e| PipelineError::Normalization(e.to_string()))?;

        debug!(
            file_name = %document.source().file_name,
            normalized_len = text.len(),
            "Document normalized"
        );

        self.run_with_cancel(tasks, &text, cancel).await
    }

    /// Run every task, stopping early when `cancel` fires or the request
    /// deadline passes
    ///
    /// Results gathered before the stop are kept; the in-flight task and
    /// every task not yet started are recorded as cancelled.
    pub async fn run_with_cancel(
        &self,
        tasks: &[ExtractionTask],
        document_text: &str,
        cancel: CancellationToken,
    ) -> Result<AggregatedResult, PipelineError> {
        let document_length = self.check_request(tasks, document_text)?;

        let run_id = Uuid::now_v7();
        let span = info_span!("extraction_run", %run_id, tasks = tasks.len());

        async move {
            info!(document_length, "Starting extraction run");

            let ctx = RunContext::new(cancel, Instant::now() + self.config.request_timeout());
            let mut aggregator = ResultAggregator::new(
                run_id,
                document_length,
                tasks.iter().map(|t| t.aim.clone()).collect(),
            );

            for (idx, task) in tasks.iter().enumerate() {
                if let Some(reason) = ctx.stop_reason() {
                    warn!(
                        remaining = tasks.len() - idx,
                        reason, "Run stopped before all tasks started"
                    );
                    break;
                }

                let outcome = self.run_task(idx + 1, task, document_text, &ctx).await;
                aggregator.collect(outcome);
            }

            let result = aggregator.finalize();
            info!(
                status = result.status().as_str(),
                tasks_processed = result.tasks_processed,
                "Extraction run finished"
            );
            Ok(result)
        }
        .instrument(span)
        .await
    }

    /// Fatal checks that reject the request before any task runs
    ///
    /// Returns the document length in characters.
    fn check_request(
        &self,
        tasks: &[ExtractionTask],
        document_text: &str,
    ) -> Result<usize, PipelineError> {
        if document_text.trim().is_empty() {
            return Err(PipelineError::EmptyDocument);
        }
        if tasks.is_empty() {
            return Err(PipelineError::NoTasks);
        }
        if let Some(idx) = tasks.iter().position(|t| !t.has_fields()) {
            return Err(PipelineError::TaskWithoutFields { position: idx + 1 });
        }

        let length = document_text.chars().count();
        if length > self.config.max_document_chars {
            return Err(PipelineError::DocumentTooLong {
                length,
                max: self.config.max_document_chars,
            });
        }

        Ok(length)
    }

    async fn run_task(
        &self,
        position: usize,
        task: &ExtractionTask,
        document_text: &str,
        ctx: &RunContext,
    ) -> ExtractionOutcome {
        let mut tracker = TaskTracker::new(position);

        tracker.advance(TaskState::Compiling);
        let contract = match self.compiler.compile(task) {
            Ok(contract) => contract,
            Err(e) => {
                warn!(task = position, error = %e, "Task failed to compile");
                tracker.advance(TaskState::Failed);
                return ExtractionOutcome {
                    position,
                    aim: task.aim.clone(),
                    result: Err(TaskError::SchemaCompilation(e)),
                    attempts: 0,
                };
            }
        };

        tracker.advance(TaskState::Executing);
        let execution = Executor::new(self.backend.as_ref(), &self.config)
            .execute(position, document_text, &contract, ctx)
            .await;

        tracker.advance(if execution.result.is_ok() {
            TaskState::Succeeded
        } else {
            TaskState::Failed
        });

        ExtractionOutcome {
            position,
            aim: task.aim.clone(),
            result: execution.result,
            attempts: execution.attempts,
        }
    }
}

/// Tracks one task through its state machine
struct TaskTracker {
    position: usize,
    state: TaskState,
}

impl TaskTracker {
    fn new(position: usize) -> Self {
        Self {
            position,
            state: TaskState::Pending,
        }
    }

    fn advance(&mut self, next: TaskState) {
        if !self.state.can_transition_to(next) {
            error!(
                task = self.position,
                from = %self.state,
                to = %next,
                "Rejected invalid task state transition"
            );
            return;
        }
        debug!(task = self.position, from = %self.state, to = %next, "Task state changed");
        self.state = next;
    }
}
