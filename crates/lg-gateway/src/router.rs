//! HTTP routes.
//!
//! | Route | Success | Failure |
//! |-------|---------|---------|
//! | `POST /invoke` | 200 once committed | 500 |
//! | `POST /deploy` | 200 once committed | orderer's 4xx/5xx if rejected, else 500 |
//! | `POST /query` | 200 with the payload as text | 500 |
//! | `POST /events/commit` | 202 | 422 on a malformed event |
//! | `GET /health` | 200 | - |
//!
//! Only a pass/fail signal reaches callers; diagnostic detail is logged.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use lg_tx_coordinator::{CommitOutcome, TransactionApi};
use serde::Deserialize;
use serde_json::{json, Value};
use shared_bus::CommitEventPublisher;
use shared_types::CommitEvent;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    api: Arc<dyn TransactionApi>,
    events: Arc<dyn CommitEventPublisher>,
}

impl AppState {
    pub fn new(api: Arc<dyn TransactionApi>, events: Arc<dyn CommitEventPublisher>) -> Self {
        Self { api, events }
    }
}

/// Request body shared by `/invoke`, `/query` and `/deploy`.
#[derive(Debug, Deserialize)]
struct ChaincodeRequest {
    #[serde(default)]
    data: Value,
}

/// Build the gateway router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/invoke", post(invoke))
        .route("/deploy", post(deploy))
        .route("/query", post(query))
        .route("/events/commit", post(commit_event))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn invoke(State(state): State<AppState>, Json(body): Json<ChaincodeRequest>) -> StatusCode {
    let outcome = state.api.submit_transaction(&body.data).await;
    commit_status(&outcome)
}

async fn deploy(State(state): State<AppState>, Json(body): Json<ChaincodeRequest>) -> StatusCode {
    let outcome = state.api.submit_deployment(&body.data).await;
    if let Some(e) = outcome.error() {
        warn!(error = %e, "Deployment failed");
    }
    match outcome {
        CommitOutcome::SubmissionRejected { code, .. } => rejection_status(code),
        other => commit_status(&other),
    }
}

/// The orderer's refusal code, when it is an HTTP error status.
fn rejection_status(code: u16) -> StatusCode {
    StatusCode::from_u16(code)
        .ok()
        .filter(|status| status.is_client_error() || status.is_server_error())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn query(
    State(state): State<AppState>,
    Json(body): Json<ChaincodeRequest>,
) -> impl IntoResponse {
    match state.api.query(&body.data).await {
        Ok(response) => (
            StatusCode::OK,
            String::from_utf8_lossy(&response.payload).into_owned(),
        ),
        Err(e) => {
            warn!(error = %e, "Query failed");
            (StatusCode::INTERNAL_SERVER_ERROR, String::new())
        }
    }
}

async fn commit_event(
    State(state): State<AppState>,
    Json(event): Json<CommitEvent>,
) -> impl IntoResponse {
    let tx_id = event.tx_id.clone();
    let resolved = state.events.publish(event).await;
    debug!(tx_id = %tx_id, resolved, "Commit event ingested");
    (StatusCode::ACCEPTED, Json(json!({ "resolved": resolved })))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let stats = state.api.commit_watch_stats();
    Json(json!({
        "status": "ok",
        "pending_watches": stats.pending,
        "committed": stats.committed,
        "timed_out": stats.timed_out,
    }))
}

fn commit_status(outcome: &CommitOutcome) -> StatusCode {
    if outcome.is_success() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
