//! docsift Extractor
//!
//! Runs schema-driven extraction tasks over a normalized document.
//!
//! # Overview
//!
//! A request carries one document and an ordered list of tasks, each with a
//! natural-language aim and a runtime field list. Every task is compiled into
//! a contract, sent to the backend, parsed and validated, and its outcome is
//! stored under `task_<position>`. One failing task never takes the others
//! down.
//!
//! # Architecture
//!
//! ```text
//! Document → Normalizer → Orchestrator ─┬─ Compiler → Executor → Backend
//!                                       └─ Aggregator → ExtractionResponse
//! ```
//!
//! # Key Features
//!
//! - **Failure isolation**: compilation and validation errors stay in their slot
//! - **Bounded retries**: at most `1 + retry_limit` backend calls per task
//! - **Cancellation**: a token and a request deadline stop the run; partial
//!   results are kept
//! - **Stable ordering**: slots always follow submission order
//!
//! # Example Usage
//!
//! ```no_run
//! use docsift_extractor::{ExtractionResponse, ExtractorConfig, Orchestrator};
//! use docsift_domain::{ExtractionTask, FieldSpec, FieldType};
//! use docsift_llm::MockProvider;
//!
//! # async fn example() {
//! let backend = MockProvider::new(r#"{"invoice_number": "INV-001", "total_amount": 120.0}"#);
//! let orchestrator = Orchestrator::new(backend, ExtractorConfig::default());
//!
//! let tasks = vec![ExtractionTask::new(
//!     "extract header",
//!     vec![
//!         FieldSpec::new("invoice_number", FieldType::String).mandatory(),
//!         FieldSpec::new("total_amount", FieldType::Number).mandatory(),
//!     ],
//! )];
//!
//! let result = orchestrator.run(&tasks, "Invoice INV-001 ... Total: 120.00").await;
//! let response = ExtractionResponse::from(result);
//! println!("{}", serde_json::to_string_pretty(&response).unwrap());
//! # }
//! ```

#![warn(missing_docs)]

mod aggregator;
mod config;
mod error;
mod executor;
mod normalize;
mod orchestrator;
mod parser;
mod prompt;
mod response;
mod types;


pub use aggregator::{ResultAggregator, NOT_STARTED};
pub use config::ExtractorConfig;
pub use error::{PipelineError, TaskError};
pub use executor::{Execution, Executor, RunContext};
pub use normalize::{MockNormalizer, PassthroughNormalizer, SAMPLE_MARKDOWN};
pub use orchestrator::Orchestrator;
pub use parser::parse_payload;
pub use prompt::PromptBuilder;
pub use response::{ErrorDetail, ExtractionResponse, TaskResults, TaskSlot};
pub use types::{AggregatedResult, ExtractionOutcome, RunStatus, TaskState, TaskSuccess};
pub use tokio_util::sync::CancellationToken;
