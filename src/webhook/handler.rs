use crate::admission::{DeletionRequest, Evaluation, Gate, Operation};
use crate::metrics::{encode_text, exporter};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use bytes::Bytes;
use kube::core::admission::{self, AdmissionRequest, AdmissionResponse, AdmissionReview};
use kube::core::DynamicObject;
use tracing::{error, warn};

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Clone)]
pub struct WebhookState {
    gate: Gate,
}

impl WebhookState {
    pub fn new(gate: Gate) -> Self {
        Self { gate }
    }
}

/// Admission reviews are accepted on every path not claimed by a probe.
pub fn create_webhook_router(state: WebhookState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .fallback(handle_admission)
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn metrics(State(state): State<WebhookState>) -> Response {
    match encode_text(state.gate.metrics()) {
        Ok(text) => ([(header::CONTENT_TYPE, exporter::CONTENT_TYPE)], text).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn handle_admission(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if content_type != JSON_CONTENT_TYPE {
        warn!(
            content_type,
            "Unsupported content type, only {} is supported", JSON_CONTENT_TYPE
        );
        return StatusCode::BAD_REQUEST.into_response();
    }

    let review: AdmissionReview<DynamicObject> = match serde_json::from_slice(&body) {
        Ok(review) => review,
        Err(e) => {
            warn!(error = %e, "Could not read request body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let request: AdmissionRequest<DynamicObject> = match review.try_into() {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Admission review carries no request");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let evaluation = state.gate.evaluate(&deletion_request(&request)).await;
    admission_response(&request, &evaluation)
}

pub fn deletion_request(request: &AdmissionRequest<DynamicObject>) -> DeletionRequest {
    let operation = match request.operation {
        admission::Operation::Create => Operation::Create,
        admission::Operation::Update => Operation::Update,
        admission::Operation::Delete => Operation::Delete,
        admission::Operation::Connect => Operation::Connect,
    };

    DeletionRequest {
        uid: request.uid.clone(),
        operation,
        kind: request.kind.kind.clone(),
        name: request.name.clone(),
        namespace: request.namespace.clone(),
        username: request.user_info.username.clone(),
        groups: request.user_info.groups.clone().unwrap_or_default(),
    }
}

/// Allowed requests answer 200, denied ones 500; both carry the review.
fn admission_response(
    request: &AdmissionRequest<DynamicObject>,
    evaluation: &Evaluation,
) -> Response {
    let mut response = AdmissionResponse::from(request);
    let status = if evaluation.is_allowed() {
        StatusCode::OK
    } else {
        response = response.deny(evaluation.message().unwrap_or_default());
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (status, Json(response.into_review())).into_response()
}
