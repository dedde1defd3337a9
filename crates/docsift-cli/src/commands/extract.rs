//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::commands::{load_tasks, render};
use crate::config::Config;
use crate::error::{CliError, Result};
use docsift_domain::{Document, DocumentSource};
use docsift_extractor::{
    CancellationToken, ExtractionResponse, MockNormalizer, Orchestrator, PassthroughNormalizer,
};
use docsift_llm::AnyProvider;
use std::fs;
use tracing::warn;

/// Execute the extract command.
///
/// Prints the response JSON. Ctrl-C cancels the run; results gathered so far
/// are still printed.
pub async fn execute_extract(args: ExtractArgs, config: &Config, pretty: bool) -> Result<()> {
    let tasks = load_tasks(&args.tasks)?;
    let content = fs::read_to_string(&args.document)?;

    let file_name = args
        .document
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut source = DocumentSource::new(file_name);
    if let Some(mime) = args.file_type {
        source = source.with_mime_type(mime);
    }
    let document = Document::new(content, source);

    let backend = AnyProvider::from_config(&config.backend)?;
    let orchestrator = Orchestrator::new(backend, config.extractor.clone());

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling remaining tasks");
            on_interrupt.cancel();
        }
    });

    let result = if args.mock_normalization {
        orchestrator
            .run_document(&MockNormalizer, &document, &tasks, cancel)
            .await
    } else {
        orchestrator
            .run_document(&PassthroughNormalizer, &document, &tasks, cancel)
            .await
    };

    match result {
        Ok(aggregated) => {
            println!("{}", render(&ExtractionResponse::from(&aggregated), pretty)?);
            Ok(())
        }
        Err(e) => {
            println!("{}", render(&ExtractionResponse::from(&e), pretty)?);
            Err(CliError::Pipeline(e))
        }
    }
}
