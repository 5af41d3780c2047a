//! HTTP route handlers for annotation export

use axum::{
    Router,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::cpc::writer;
use crate::labels::CodePolicy;
use crate::source::SourceErrorResponse;
use crate::state::AppState;

use super::builder::build_cpc;
use super::csv::annotations_csv;

fn default_policy() -> CodePolicy {
    CodePolicy::IdOnly
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// Label-code convention for the exported file
    #[serde(default = "default_policy")]
    pub policy: CodePolicy,
}

/// GET /api/images/:id/export.cpc - Download the image's CPC document
pub async fn export_cpc(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, SourceErrorResponse> {
    let image = state
        .store
        .get_image(id)
        .await
        .map_err(SourceErrorResponse::from)?;

    let doc = build_cpc(&image, query.policy, &state.config.cpc);
    let text = writer::serialize(&doc);

    let mut headers = HeaderMap::new();
    headers.insert("Content-Type", HeaderValue::from_static("text/plain"));
    let disposition = format!("attachment; filename=\"{}\"", cpc_filename(&image.name));
    headers.insert(
        "Content-Disposition",
        HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    Ok((StatusCode::OK, headers, Body::from(text)).into_response())
}

/// GET /api/export/annotations.csv - Download all annotations as CSV
pub async fn export_csv(State(state): State<AppState>) -> Response {
    let images = state.store.all_images().await;
    let csv = annotations_csv(&images);

    let mut headers = HeaderMap::new();
    headers.insert("Content-Type", HeaderValue::from_static("text/csv"));
    headers.insert(
        "Content-Disposition",
        HeaderValue::from_static("attachment; filename=\"annotations.csv\""),
    );

    (StatusCode::OK, headers, Body::from(csv)).into_response()
}

/// Derive the download filename from the image name's final component.
fn cpc_filename(image_name: &str) -> String {
    let filename = image_name
        .rsplit(['/', '\\'])
        .next()
        .filter(|f| !f.is_empty())
        .unwrap_or("annotations");
    let stem = filename.rsplit_once('.').map(|(s, _)| s).unwrap_or(filename);
    // Quotes and control characters would corrupt the header value.
    let stem: String = stem
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect();
    format!("{}.cpc", stem)
}

/// Build export API routes
pub fn export_routes(state: AppState) -> Router {
    Router::new()
        .route("/images/:id/export.cpc", get(export_cpc))
        .route("/export/annotations.csv", get(export_csv))
        .with_state(state)
}
