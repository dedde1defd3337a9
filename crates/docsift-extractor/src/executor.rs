//! Extraction executor: backend call, parse, validate, retry

use crate::config::ExtractorConfig;
use crate::error::TaskError;
use crate::parser::parse_payload;
use crate::prompt::PromptBuilder;
use crate::types::TaskSuccess;
use docsift_domain::ExtractionBackend;
use docsift_schema::{validate, CompiledContract};
use tokio::time::{sleep_until, timeout, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Request-scoped cancellation state shared by every task of a run
#[derive(Debug, Clone)]
pub struct RunContext {
    cancel: CancellationToken,
    deadline: Instant,
}

impl RunContext {
    /// Create a context that ends at `deadline` or when `cancel` fires
    pub fn new(cancel: CancellationToken, deadline: Instant) -> Self {
        Self { cancel, deadline }
    }

    /// Why the run must stop, if it must
    pub fn stop_reason(&self) -> Option<&'static str> {
        if self.cancel.is_cancelled() {
            Some(CANCELLED)
        } else if Instant::now() >= self.deadline {
            Some(DEADLINE)
        } else {
            None
        }
    }

    /// Resolve once the run must stop
    pub async fn stopped(&self) -> &'static str {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => CANCELLED,
            _ = sleep_until(self.deadline) => DEADLINE,
        }
    }
}

const CANCELLED: &str = "request cancelled";
const DEADLINE: &str = "request deadline exceeded";

/// Result of executing one compiled task
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Validated data or the last error seen
    pub result: Result<TaskSuccess, TaskError>,

    /// Backend calls made
    pub attempts: u32,
}

/// Runs one compiled contract against the backend
///
/// Makes at most `1 + retry_limit` backend calls. Parse, validation and
/// invocation errors are retried with the same prompt; cancellation is not.
pub struct Executor<'a, B> {
    backend: &'a B,
    config: &'a ExtractorConfig,
}

impl<'a, B> Executor<'a, B>
where
    B: ExtractionBackend,
{
    /// Create an executor borrowing the run's backend and config
    pub fn new(backend: &'a B, config: &'a ExtractorConfig) -> Self {
        Self { backend, config }
    }

    /// Execute a contract against the document text
    pub async fn execute(
        &self,
        position: usize,
        document_text: &str,
        contract: &CompiledContract,
        ctx: &RunContext,
    ) -> Execution {
        let prompt = PromptBuilder::new(contract.instruction(), document_text).build();
        let json_schema = self
            .config
            .structured_output
            .then(|| contract.json_schema().to_string());
        let max_attempts = self.config.max_attempts();

        debug!(task = position, prompt_len = prompt.len(), max_attempts, "Prompt built");

        let mut attempts = 0;
        loop {
            if let Some(reason) = ctx.stop_reason() {
                return Execution {
                    result: Err(TaskError::Cancelled(reason.to_string())),
                    attempts,
                };
            }

            attempts += 1;
            debug!(
                task = position,
                attempt = attempts,
                instruction = contract.instruction(),
                "Extraction attempt"
            );

            match self.attempt(&prompt, json_schema.as_deref(), contract, ctx).await {
                Ok(success) => {
                    info!(task = position, attempt = attempts, "Extraction attempt succeeded");
                    return Execution {
                        result: Ok(success),
                        attempts,
                    };
                }
                Err(e) if e.is_retryable() && attempts < max_attempts => {
                    warn!(
                        task = position,
                        attempt = attempts,
                        kind = e.kind(),
                        error = %e,
                        "Extraction attempt failed, retrying"
                    );
                }
                Err(e) => {
                    warn!(
                        task = position,
                        attempt = attempts,
                        kind = e.kind(),
                        error = %e,
                        "Extraction failed"
                    );
                    return Execution {
                        result: Err(e),
                        attempts,
                    };
                }
            }
        }
    }

    async fn attempt(
        &self,
        prompt: &str,
        json_schema: Option<&str>,
        contract: &CompiledContract,
        ctx: &RunContext,
    ) -> Result<TaskSuccess, TaskError> {
        let call = async {
            match json_schema {
                Some(schema) => self.backend.generate_structured(prompt, schema).await,
                None => self.backend.generate(prompt).await,
            }
        };

        let response = tokio::select! {
            biased;
            reason = ctx.stopped() => return Err(TaskError::Cancelled(reason.to_string())),
            response = timeout(self.config.attempt_timeout(), call) => response,
        };

        let text = match response {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(TaskError::BackendInvocation(e.to_string())),
            Err(_) => {
                return Err(TaskError::BackendInvocation(format!(
                    "Attempt timed out after {}s",
                    self.config.attempt_timeout_secs
                )))
            }
        };

        debug!(response_len = text.len(), backend = self.backend.name(), "Backend responded");

        let payload = parse_payload(&text)?;
        let validated = validate(&payload, contract.schema())?;

        Ok(TaskSuccess {
            data: validated.data,
            warnings: validated.warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsift_domain::{ExtractionTask, FieldSpec, FieldType};
    use docsift_llm::MockProvider;
    use serde_json::json;
    use std::time::Duration;

    fn contract() -> CompiledContract {
        docsift_schema::compile(&ExtractionTask::new(
            "extract header",
            vec![
                FieldSpec::new("invoice_number", FieldType::String).mandatory(),
                FieldSpec::new("total_amount", FieldType::Number).mandatory(),
            ],
        ))
        .unwrap()
    }

    fn ctx() -> RunContext {
        RunContext::new(
            CancellationToken::new(),
            Instant::now() + Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn test_first_attempt_success() {
        let backend = MockProvider::new(r#"{"invoice_number": "INV-001", "total_amount": "120.00"}"#);
        let config = ExtractorConfig::default();

        let execution = Executor::new(&backend, &config)
            .execute(1, "Invoice INV-001", &contract(), &ctx())
            .await;

        assert_eq!(execution.attempts, 1);
        let success = execution.result.unwrap();
        assert_eq!(success.data, json!({"invoice_number": "INV-001", "total_amount": 120.0}));
    }

    #[tokio::test]
    async fn test_retry_after_unparseable_output() {
        let mut backend = MockProvider::new(r#"{"invoice_number": "INV-001", "total_amount": 120}"#);
        backend.push_response("Sorry, I cannot help with that.");
        let config = ExtractorConfig::default();

        let execution = Executor::new(&backend, &config)
            .execute(1, "doc", &contract(), &ctx())
            .await;

        assert_eq!(execution.attempts, 2);
        assert!(execution.result.is_ok());
        assert_eq!(backend.prompts()[0], backend.prompts()[1]);
    }

    #[tokio::test]
    async fn test_retry_budget_is_bounded() {
        let backend = MockProvider::new(r#"{"invoice_number": "INV-001"}"#);
        let config = ExtractorConfig {
            retry_limit: 1,
            ..ExtractorConfig::default()
        };

        let execution = Executor::new(&backend, &config)
            .execute(1, "doc", &contract(), &ctx())
            .await;

        assert_eq!(execution.attempts, 2);
        assert_eq!(backend.call_count(), 2);
        match execution.result {
            Err(TaskError::Validation(failure)) => {
                assert_eq!(failure.fields(), vec!["total_amount"]);
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_retry_after_backend_error() {
        let mut backend = MockProvider::new(r#"{"invoice_number": "INV-001", "total_amount": 120}"#);
        backend.push_error("rate limited");
        let config = ExtractorConfig::default();

        let execution = Executor::new(&backend, &config)
            .execute(1, "doc", &contract(), &ctx())
            .await;

        assert_eq!(execution.attempts, 2);
        assert_eq!(backend.call_count(), 2);
        assert!(execution.result.is_ok());
    }

    #[tokio::test]
    async fn test_persistent_backend_error_exhausts_budget() {
        let mut backend = MockProvider::default();
        backend.add_error("DOCUMENT CONTENT");
        let config = ExtractorConfig::default();

        let execution = Executor::new(&backend, &config)
            .execute(1, "doc", &contract(), &ctx())
            .await;

        assert_eq!(execution.attempts, config.max_attempts());
        assert_eq!(backend.call_count(), config.max_attempts() as usize);
        assert!(matches!(execution.result, Err(TaskError::BackendInvocation(_))));
    }

    #[tokio::test]
    async fn test_attempt_timeout_is_invocation_error() {
        let mut backend = MockProvider::default();
        backend.add_delayed_response("DOCUMENT CONTENT", Duration::from_secs(5), "{}");
        let config = ExtractorConfig {
            retry_limit: 0,
            attempt_timeout_secs: 1,
            ..ExtractorConfig::default()
        };

        let execution = Executor::new(&backend, &config)
            .execute(1, "doc", &contract(), &ctx())
            .await;

        assert_eq!(execution.attempts, 1);
        assert!(matches!(execution.result, Err(TaskError::BackendInvocation(_))));
    }

    #[tokio::test]
    async fn test_cancelled_before_first_attempt() {
        let backend = MockProvider::default();
        let config = ExtractorConfig::default();
        let ctx = ctx();
        ctx.cancel.cancel();

        let execution = Executor::new(&backend, &config)
            .execute(1, "doc", &contract(), &ctx)
            .await;

        assert_eq!(execution.attempts, 0);
        assert_eq!(backend.call_count(), 0);
        assert!(matches!(execution.result, Err(TaskError::Cancelled(_))));
    }

    #[tokio::test]
    async fn test_structured_output_can_be_disabled() {
        let backend = MockProvider::new(r#"{"invoice_number": "A", "total_amount": 1}"#);
        let config = ExtractorConfig {
            structured_output: false,
            ..ExtractorConfig::default()
        };

        let execution = Executor::new(&backend, &config)
            .execute(1, "doc", &contract(), &ctx())
            .await;
        assert!(execution.result.is_ok());
    }
}
