//! CPC batch upload pipeline
//!
//! Each file is parsed, matched against registered images, and mapped onto
//! the label set. The whole batch is staged before anything is written: the
//! first structural or mapping failure aborts with nothing committed.
//! A file whose image path matches no registered image is skipped, which is
//! a normal outcome, not an error.

use std::collections::HashMap;

use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::annotation::{Annotation, AnnotationKind, Point};
use crate::cpc::{CpcDocument, CpcError, CpcParser, find_matching_image};
use crate::labels::mapping::code_for_point;
use crate::labels::{CodePolicy, LabelSet};
use crate::source::types::{CpcImport, ImageRecord, SourceError, StoredCpc};
use crate::source::SourceStore;

/// Errors that abort an upload batch
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{filename}: {source}")]
    Cpc {
        filename: String,
        #[source]
        source: CpcError,
    },

    #[error("{filename}: {source}")]
    Source {
        filename: String,
        #[source]
        source: SourceError,
    },

    #[error("The source has no label set")]
    NoLabelSet,
}

/// One file in an upload batch
#[derive(Debug, Clone, Deserialize)]
pub struct CpcUploadFile {
    pub filename: String,
    pub content: String,
}

/// Per-file result of a committed batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
    pub image_id: Uuid,
    pub image_name: String,
    pub point_count: usize,
}

/// Result of a committed batch
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub uploaded: Vec<UploadedFile>,
    /// Files whose image path matched no registered image
    pub skipped: Vec<String>,
}

/// Process and commit an upload batch.
///
/// All files are validated and staged first; the store is only touched once
/// every file has either staged cleanly or been skipped.
pub async fn process_batch(
    store: &SourceStore,
    parser: &CpcParser,
    policy: CodePolicy,
    files: &[CpcUploadFile],
) -> Result<UploadOutcome, UploadError> {
    let label_set = store.label_set().await;
    if label_set.is_empty() {
        return Err(UploadError::NoLabelSet);
    }

    let names = store.image_names().await;
    let name_strings: Vec<&str> = names.iter().map(|(_, n)| n.as_str()).collect();

    let mut outcome = UploadOutcome::default();
    let mut imports = Vec::new();

    for file in files {
        let parsed = parser
            .parse_bytes(file.content.as_bytes())
            .map_err(|e| UploadError::Cpc {
                filename: file.filename.clone(),
                source: e,
            })?;

        let Some(index) = find_matching_image(&parsed.document.image_filepath, &name_strings)
        else {
            debug!(
                "No image matches '{}' from {}; skipping",
                parsed.document.image_filepath, file.filename
            );
            counter!("reefpoint_cpc_files_skipped_total").increment(1);
            outcome.skipped.push(file.filename.clone());
            continue;
        };
        let (image_id, image_name) = &names[index];

        let image = store
            .get_image(*image_id)
            .await
            .map_err(|e| UploadError::Source {
                filename: file.filename.clone(),
                source: e,
            })?;

        let import = stage_file(&image, parsed.document, parsed.content_sha256, policy, &label_set)
            .map_err(|e| UploadError::Source {
                filename: file.filename.clone(),
                source: e,
            })?;

        outcome.uploaded.push(UploadedFile {
            filename: file.filename.clone(),
            image_id: *image_id,
            image_name: image_name.clone(),
            point_count: import.points.len(),
        });
        imports.push(import);
    }

    let point_total: usize = imports.iter().map(|i| i.points.len()).sum();
    store.commit_imports(imports).await;

    counter!("reefpoint_cpc_files_parsed_total").increment(outcome.uploaded.len() as u64);
    counter!("reefpoint_points_imported_total").increment(point_total as u64);
    info!(
        "CPC batch committed: {} files, {} points, {} skipped",
        outcome.uploaded.len(),
        point_total,
        outcome.skipped.len()
    );

    Ok(outcome)
}

/// Validate one parsed document against an image and the label set,
/// producing a staged import. Point positions are converted from CPC units
/// to pixels with the scale derived from the document's declared dimensions.
fn stage_file(
    image: &ImageRecord,
    doc: CpcDocument,
    content_sha256: String,
    policy: CodePolicy,
    label_set: &LabelSet,
) -> Result<CpcImport, SourceError> {
    let mut points = Vec::with_capacity(doc.points.len());
    let mut annotations = HashMap::new();

    for (i, cpc_point) in doc.points.iter().enumerate() {
        let number = i as u32 + 1;
        let column = to_pixel(cpc_point.x, image.width, doc.image_width);
        let row = to_pixel(cpc_point.y, image.height, doc.image_height);
        if row < 0 || row >= image.height as i64 || column < 0 || column >= image.width as i64 {
            return Err(SourceError::PointOffImage {
                point_number: number,
                row,
                column,
            });
        }

        let code = code_for_point(&cpc_point.id, &cpc_point.notes, policy);
        if !code.is_empty() {
            let label = label_set
                .lookup(&code)
                .ok_or_else(|| SourceError::UnknownLabelCode {
                    point_number: number,
                    code: code.clone(),
                })?;
            annotations.insert(
                number,
                Annotation {
                    label_code: label.code.clone(),
                    kind: AnnotationKind::Human,
                },
            );
        }

        points.push(Point {
            number,
            row: row as u32,
            column: column as u32,
            display_label: Some(cpc_point.number_label.clone()),
        });
    }

    Ok(CpcImport {
        image_id: image.id,
        points,
        annotations,
        cpc: StoredCpc {
            code_filepath: doc.code_filepath,
            image_filepath: doc.image_filepath,
            image_width: doc.image_width,
            image_height: doc.image_height,
            display_width: doc.display_width,
            display_height: doc.display_height,
            annotation_area: doc.annotation_area,
            headers: doc.headers,
            content_sha256,
        },
    })
}

/// Convert a CPC-unit coordinate to pixels, rounding to nearest.
fn to_pixel(unit: i64, image_dim: u32, cpc_dim: u32) -> i64 {
    (unit as f64 * image_dim as f64 / cpc_dim as f64).round() as i64
}
