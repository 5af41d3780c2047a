//! HTTP route handlers for the source API

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::annotation::{
    Annotation, AnnotationCounts, AnnotationKind, GenerateSpec, PixelRect, Status, VerboseStatus,
};
use crate::labels::Label;
use crate::state::AppState;

use super::types::{ImageSummary, SourceError};

/// Error response for the source API
#[derive(Debug, Serialize)]
pub struct SourceErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<SourceError> for SourceErrorResponse {
    fn from(e: SourceError) -> Self {
        let code = match &e {
            SourceError::ImageNotFound(_) => "image_not_found",
            SourceError::PointNotFound(_) => "point_not_found",
            SourceError::DuplicateImageName(_) => "duplicate_image_name",
            SourceError::NoLabelSet => "no_label_set",
            SourceError::UnknownLabelCode { .. } => "unknown_label_code",
            SourceError::PointOffImage { .. } => "point_off_image",
            SourceError::LabelSet(_) => "invalid_label_set",
            SourceError::PointGen(_) => "invalid_point_spec",
            SourceError::InvalidRequest(_) => "invalid_request",
        };
        Self {
            error: e.to_string(),
            code: code.to_string(),
        }
    }
}

impl IntoResponse for SourceErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "image_not_found" | "point_not_found" => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterImageRequest {
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub annotation_area: Option<PixelRect>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LabelSetResponse {
    pub labels: Vec<Label>,
}

#[derive(Debug, Deserialize)]
pub struct SetLabelSetRequest {
    pub labels: Vec<Label>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnnotatedPoint {
    pub number: u32,
    pub row: u32,
    pub column: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageAnnotationsResponse {
    pub image_id: Uuid,
    pub name: String,
    pub points: Vec<AnnotatedPoint>,
    pub counts: AnnotationCounts,
    pub status: Status,
    pub verbose_status: VerboseStatus,
}

#[derive(Debug, Deserialize)]
pub struct SetAnnotationRequest {
    pub point_number: u32,
    pub label_code: String,
    /// true for a human-confirmed annotation, false for a machine suggestion
    pub confirmed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnnotationStatusResponse {
    pub counts: AnnotationCounts,
    pub status: Status,
    pub verbose_status: VerboseStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratePointsResponse {
    pub point_count: usize,
    pub points: Vec<crate::annotation::Point>,
}

/// GET /api/images - List registered images
pub async fn list_images(State(state): State<AppState>) -> Json<Vec<ImageSummary>> {
    Json(state.store.list_images().await)
}

/// POST /api/images - Register an image
pub async fn register_image(
    State(state): State<AppState>,
    Json(req): Json<RegisterImageRequest>,
) -> Result<(StatusCode, Json<ImageSummary>), SourceErrorResponse> {
    let summary = state
        .store
        .register_image(&req.name, req.width, req.height, req.annotation_area)
        .await
        .map_err(|e| {
            tracing::warn!("Failed to register image '{}': {}", req.name, e);
            SourceErrorResponse::from(e)
        })?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// GET /api/labelset - Get the source label set
pub async fn get_labelset(State(state): State<AppState>) -> Json<LabelSetResponse> {
    let labels = state.store.label_set().await.iter().cloned().collect();
    Json(LabelSetResponse { labels })
}

/// POST /api/labelset - Replace the source label set
pub async fn set_labelset(
    State(state): State<AppState>,
    Json(req): Json<SetLabelSetRequest>,
) -> Result<Json<LabelSetResponse>, SourceErrorResponse> {
    state
        .store
        .set_label_set(req.labels.clone())
        .await
        .map_err(SourceErrorResponse::from)?;
    Ok(Json(LabelSetResponse { labels: req.labels }))
}

/// GET /api/images/:id/annotations - Points, annotations, and status
pub async fn get_annotations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ImageAnnotationsResponse>, SourceErrorResponse> {
    let image = state
        .store
        .get_image(id)
        .await
        .map_err(SourceErrorResponse::from)?;

    let points = image
        .points
        .iter()
        .map(|p| AnnotatedPoint {
            number: p.number,
            row: p.row,
            column: p.column,
            annotation: image.annotations.get(&p.number).cloned(),
        })
        .collect();

    let counts = image.counts();
    Ok(Json(ImageAnnotationsResponse {
        image_id: image.id,
        name: image.name,
        points,
        counts,
        status: counts.status(),
        verbose_status: counts.verbose_status(),
    }))
}

/// POST /api/images/:id/annotations - Set one point annotation
pub async fn set_annotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetAnnotationRequest>,
) -> Result<Json<AnnotationStatusResponse>, SourceErrorResponse> {
    let kind = if req.confirmed {
        AnnotationKind::Human
    } else {
        AnnotationKind::Machine
    };
    let counts = state
        .store
        .set_annotation(id, req.point_number, &req.label_code, kind)
        .await
        .map_err(SourceErrorResponse::from)?;
    Ok(Json(AnnotationStatusResponse {
        counts,
        status: counts.status(),
        verbose_status: counts.verbose_status(),
    }))
}

/// POST /api/images/:id/points/generate - Generate sample points
pub async fn generate_image_points(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(spec): Json<GenerateSpec>,
) -> Result<Json<GeneratePointsResponse>, SourceErrorResponse> {
    let points = state
        .store
        .generate_points(id, spec)
        .await
        .map_err(SourceErrorResponse::from)?;
    Ok(Json(GeneratePointsResponse {
        point_count: points.len(),
        points,
    }))
}

/// Build source API routes
pub fn source_routes(state: AppState) -> Router {
    Router::new()
        .route("/images", get(list_images).post(register_image))
        .route(
            "/images/:id/annotations",
            get(get_annotations).post(set_annotation),
        )
        .route("/images/:id/points/generate", post(generate_image_points))
        .route("/labelset", get(get_labelset).post(set_labelset))
        .with_state(state)
}
