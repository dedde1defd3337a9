//! HTTP request handlers for the extraction service.
//!
//! Implements the extraction and health check endpoints using axum.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use docsift_domain::{Document, DocumentSource, ExtractionBackend, ExtractionTask};
use docsift_extractor::{
    CancellationToken, ExtractionResponse, MockNormalizer, Orchestrator, PassthroughNormalizer,
    PipelineError,
};
use docsift_llm::AnyProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Pipeline over the configured backend
    pub orchestrator: Arc<Orchestrator<AnyProvider>>,
    /// Replace documents with the built-in sample instead of reading them
    pub mock_normalization: bool,
}

/// Extraction request body
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    /// Normalized document text
    #[serde(default)]
    pub file_data: String,

    /// Original file name
    #[serde(default)]
    pub file_name: String,

    /// MIME type
    #[serde(default)]
    pub file_type: Option<String>,

    /// Tasks in execution order
    #[serde(default)]
    pub tasks: Vec<ExtractionTask>,
}

impl ExtractRequest {
    fn document(&self) -> Document {
        let mut source = DocumentSource::new(self.file_name.clone());
        if let Some(mime) = &self.file_type {
            source = source.with_mime_type(mime.clone());
        }
        Document::new(self.file_data.clone(), source)
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Always "ok" while the process serves requests
    pub status: String,
    /// Service name
    pub service: String,
    /// Backend provider name
    pub backend: String,
    /// Backend model
    pub model: String,
}

fn status_for(error: &PipelineError) -> StatusCode {
    match error {
        PipelineError::Normalization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

/// POST /extract - Run every task against the document
///
/// Returns 200 for `success` and `partial`; fatal request errors come back
/// in the same response shape with a 4xx/5xx status.
async fn extract(
    State(state): State<AppState>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected extraction request body");
            let body = ExtractionResponse::fatal(format!("Invalid request body: {}", rejection));
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    info!(
        file_name = %request.file_name,
        tasks = request.tasks.len(),
        "Received extraction request"
    );

    let document = request.document();
    let cancel = CancellationToken::new();
    let result = if state.mock_normalization {
        state
            .orchestrator
            .run_document(&MockNormalizer, &document, &request.tasks, cancel)
            .await
    } else {
        state
            .orchestrator
            .run_document(&PassthroughNormalizer, &document, &request.tasks, cancel)
            .await
    };

    match result {
        Ok(aggregated) => (StatusCode::OK, Json(ExtractionResponse::from(&aggregated))).into_response(),
        Err(e) => {
            warn!(error = %e, "Extraction request failed");
            (status_for(&e), Json(ExtractionResponse::from(&e))).into_response()
        }
    }
}

/// GET /health - Service and backend identity
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let backend = state.orchestrator.backend();
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        service: "docsift".to_string(),
        backend: backend.name().to_string(),
        model: backend.model().to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/extract", post(extract))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
