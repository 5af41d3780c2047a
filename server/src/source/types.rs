//! Source-related types and error definitions
//!
//! A "source" is one survey project: its images, its label set, and the
//! point/annotation records attached to each image.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::annotation::{
    Annotation, AnnotationCounts, PixelRect, Point, PointGenError, Status, VerboseStatus,
};
use crate::cpc::CpcCorner;
use crate::labels::LabelSetError;

/// Errors that can occur when working with the source store
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Image not found: {0}")]
    ImageNotFound(Uuid),

    #[error("Image name already registered: {0}")]
    DuplicateImageName(String),

    #[error("Point {0} not found on image")]
    PointNotFound(u32),

    #[error("The source has no label set")]
    NoLabelSet,

    #[error("Point {point_number}: label code '{code}' is not in the label set")]
    UnknownLabelCode { point_number: u32, code: String },

    #[error("Point {point_number}: position (row {row}, column {column}) is outside the image")]
    PointOffImage {
        point_number: u32,
        row: i64,
        column: i64,
    },

    #[error(transparent)]
    LabelSet(#[from] LabelSetError),

    #[error(transparent)]
    PointGen(#[from] PointGenError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// One registered survey image with its points and annotations
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub id: Uuid,
    /// Free-text name; may be a relative path with either slash style
    pub name: String,
    /// Full-resolution width in pixels
    pub width: u32,
    /// Full-resolution height in pixels
    pub height: u32,
    /// Region points are generated in; whole image when unset
    pub annotation_area: Option<PixelRect>,
    pub points: Vec<Point>,
    /// Keyed by point number
    pub annotations: HashMap<u32, Annotation>,
    /// Fields preserved from the last uploaded CPC file, for export
    pub cpc: Option<StoredCpc>,
}

impl ImageRecord {
    pub fn counts(&self) -> AnnotationCounts {
        let mut counts = AnnotationCounts::default();
        for point in &self.points {
            match self.annotations.get(&point.number) {
                None => counts.unclassified += 1,
                Some(a) if a.kind == crate::annotation::AnnotationKind::Machine => {
                    counts.unconfirmed += 1
                }
                Some(_) => counts.confirmed += 1,
            }
        }
        counts
    }

    pub fn summary(&self) -> ImageSummary {
        let counts = self.counts();
        ImageSummary {
            id: self.id,
            name: self.name.clone(),
            width: self.width,
            height: self.height,
            point_count: self.points.len(),
            status: counts.status(),
            verbose_status: counts.verbose_status(),
        }
    }
}

/// CPC fields preserved verbatim from an upload so a later export can
/// round-trip them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCpc {
    pub code_filepath: String,
    pub image_filepath: String,
    pub image_width: u32,
    pub image_height: u32,
    pub display_width: String,
    pub display_height: String,
    pub annotation_area: [CpcCorner; 4],
    pub headers: Vec<String>,
    /// SHA-256 of the raw uploaded bytes
    pub content_sha256: String,
}

/// A staged, fully validated CPC import for one image.
///
/// Imports are staged for the whole batch first and committed together, so
/// a failure in any file leaves the store untouched.
#[derive(Debug)]
pub struct CpcImport {
    pub image_id: Uuid,
    pub points: Vec<Point>,
    pub annotations: HashMap<u32, Annotation>,
    pub cpc: StoredCpc,
}

/// Summary info for image listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSummary {
    pub id: Uuid,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub point_count: usize,
    pub status: Status,
    pub verbose_status: VerboseStatus,
}

/// Store-wide counters for the metrics endpoint
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StoreStats {
    pub images: usize,
    pub points: usize,
    pub annotations: usize,
}
