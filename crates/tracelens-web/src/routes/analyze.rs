//! Analyze route handler.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracelens_core::prompt::build_prompt;
use tracelens_core::{AnalysisRequestBody, AnalysisResponse, AnalyzeError};
use tracing::{info, warn};
use uuid::Uuid;

use super::ApiError;
use crate::state::AppState;

/// `POST /analyze`: explain a failing snippet.
///
/// Rejects the request before any outbound call when `code` or `error` is
/// missing or the body is not JSON.
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequestBody>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let request_id = Uuid::new_v4();

    let Json(body) = payload.map_err(|e| {
        warn!(%request_id, error = %e, "Rejected malformed analyze request");
        AnalyzeError::bad_request(e.body_text())
    })?;
    let req = body.validate().inspect_err(|e| {
        warn!(%request_id, error = %e, "Rejected incomplete analyze request");
    })?;

    info!(
        %request_id,
        code_len = req.code.len(),
        error_len = req.error.len(),
        "Analyzing failure"
    );

    let prompt = build_prompt(&req.code, &req.error);
    let analysis = state.client.complete(&prompt).await.inspect_err(|e| {
        warn!(%request_id, error = %e, "Completion failed");
    })?;

    info!(%request_id, analysis_len = analysis.len(), "Analysis ready");

    Ok(Json(AnalysisResponse { analysis }))
}
