//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub predictions_enabled: bool,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub submissions: u64,
}

/// `GET /api/health`: liveness plus whether predictions are available.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    let predictions_enabled = ctx.core.predictions_enabled();

    Json(HealthResponse {
        status: if predictions_enabled { "ok" } else { "degraded" },
        predictions_enabled,
        version: crate::config::APP_VERSION,
        classifier: ctx.core.classifier_description(),
        detail: ctx.core.unavailable_reason().map(str::to_string),
        submissions: ctx.core.submissions(),
    })
}
