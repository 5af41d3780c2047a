//! HTTP route handlers for CPC upload

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};

use crate::labels::CodePolicy;
use crate::state::AppState;

use super::batch::{CpcUploadFile, UploadError, UploadOutcome, process_batch};

/// Error response for the upload API
#[derive(Debug, Serialize)]
pub struct UploadErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<UploadError> for UploadErrorResponse {
    fn from(e: UploadError) -> Self {
        let code = match &e {
            UploadError::Cpc { .. } => "cpc_parse_error",
            UploadError::Source { .. } => "cpc_import_error",
            UploadError::NoLabelSet => "no_label_set",
        };
        Self {
            error: e.to_string(),
            code: code.to_string(),
        }
    }
}

impl IntoResponse for UploadErrorResponse {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct CpcUploadRequest {
    /// Label-code convention the uploaded files use
    pub policy: CodePolicy,
    pub files: Vec<CpcUploadFile>,
}

/// POST /api/cpc/upload - Parse, match, and commit a batch of CPC files.
///
/// The batch commits all-or-nothing: any parse or label-mapping failure
/// rejects the whole upload. Files matching no registered image are listed
/// as skipped.
pub async fn upload_cpc(
    State(state): State<AppState>,
    Json(req): Json<CpcUploadRequest>,
) -> Result<Json<UploadOutcome>, UploadErrorResponse> {
    let parser = state.cpc_parser();
    let outcome = process_batch(&state.store, &parser, req.policy, &req.files)
        .await
        .map_err(|e| {
            tracing::warn!("CPC upload rejected: {}", e);
            UploadErrorResponse::from(e)
        })?;
    Ok(Json(outcome))
}

/// Build upload API routes
pub fn upload_routes(state: AppState) -> Router {
    Router::new()
        .route("/cpc/upload", post(upload_cpc))
        .with_state(state)
}
