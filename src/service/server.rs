// src/service/server.rs

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use color_eyre::eyre::Result;
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::{AuditConfig, ServerConfig};
use crate::core::errors::AuditError;
use crate::core::models::{AuditOutcome, AuditRequest, AuditResponse};
use crate::core::scanner::Auditor;
use crate::service::bus::{publish_json, spawn_topic_logger, MessageBus, ReportPublisher};
use crate::service::events::EventHandler;
use crate::service::storage::{persist_report, LocalReportStore, ReportStore};

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Shared state of the front door. Everything in it is read-only.
pub struct AppState {
    pub auditor: Auditor,
    pub store: Option<Arc<dyn ReportStore>>,
    pub publisher: Arc<dyn ReportPublisher>,
    pub requests_topic: String,
    pub reports_topic: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Endpoint not found")]
    NotFound,
    #[error("Server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(ref details) => {
                error!(details = %details, "Request failed with an internal error.");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/scan", post(scan_handler))
        .route("/scan/submit", post(submit_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

async fn home_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn not_found_handler() -> ApiError {
    ApiError::NotFound
}

/// Pulls a non-blank `url` out of the request body.
fn extract_url(payload: Result<Json<AuditRequest>, JsonRejection>) -> Result<String, ApiError> {
    let Json(request) = payload.map_err(|rejection| match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::BadRequest("Request must contain JSON data".to_string())
        }
        other => ApiError::BadRequest(format!("Invalid JSON body: {}", other.body_text())),
    })?;

    let url = request.url.trim();
    if url.is_empty() {
        return Err(ApiError::BadRequest("Missing URL parameter".to_string()));
    }
    Ok(url.to_string())
}

/// Audits `url` and persists the report when a store is configured.
///
/// A store failure replaces the report with the catch-all audit error.
async fn audit_and_persist(state: &AppState, url: &str) -> AuditOutcome {
    let report = state.auditor.perform_full_audit(url).await?;
    match &state.store {
        Some(store) => persist_report(store.as_ref(), report)
            .await
            .map_err(|e| AuditError::Failed(e.to_string())),
        None => Ok(report),
    }
}

async fn scan_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AuditRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let url = extract_url(payload)?;
    info!(url = %url, "Received scan request.");

    // A panic below surfaces here as a JoinError and becomes a 500.
    let task_state = Arc::clone(&state);
    let outcome = tokio::spawn(async move { audit_and_persist(&task_state, &url).await })
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let status = match &outcome {
        Ok(report) => {
            let publisher = Arc::clone(&state.publisher);
            let topic = state.reports_topic.clone();
            let report = report.clone();
            tokio::spawn(async move {
                if let Err(e) = publish_json(publisher.as_ref(), &topic, &report).await {
                    warn!(topic = %topic, error = %e, "Failed to publish audit report.");
                }
            });
            StatusCode::OK
        }
        Err(AuditError::Invalid(_)) => StatusCode::BAD_REQUEST,
        Err(AuditError::Failed(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    Ok((status, Json(AuditResponse::from(outcome))).into_response())
}

async fn submit_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AuditRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let url = extract_url(payload)?;

    let message_id = publish_json(state.publisher.as_ref(), &state.requests_topic, &AuditRequest { url })
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    info!(message_id = %message_id, topic = %state.requests_topic, "Scan request queued.");

    Ok((StatusCode::OK, Json(json!({ "message": "Scan request submitted successfully" }))).into_response())
}

/// Runs the front door and the queued-audit worker until Ctrl-C.
///
/// Inside the process the reports topic only has a logging subscriber.
pub async fn serve(config: ServerConfig, audit_config: AuditConfig) -> Result<()> {
    let auditor = Auditor::new(audit_config);
    let bus = Arc::new(MessageBus::new(&[config.requests_topic.as_str(), config.reports_topic.as_str()]));
    let store: Arc<dyn ReportStore> = Arc::new(LocalReportStore::new(&config.report_dir));

    let worker = EventHandler::new(auditor.clone(), Arc::clone(&store))
        .spawn_worker(bus.subscribe(&config.requests_topic)?);
    let reports_logger = spawn_topic_logger(config.reports_topic.clone(), bus.subscribe(&config.reports_topic)?);

    let state = Arc::new(AppState {
        auditor,
        store: config.persist_reports.then_some(store),
        publisher: bus,
        requests_topic: config.requests_topic.clone(),
        reports_topic: config.reports_topic.clone(),
    });

    let listener = TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, report_dir = %config.report_dir.display(), "Audit portal listening.");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal.");
            }
            info!("Shutdown signal received.");
        })
        .await?;

    worker.abort();
    reports_logger.abort();
    Ok(())
}
