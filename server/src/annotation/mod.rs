//! Sample points, annotations, and per-image status derivation

pub mod points;
pub mod status;

use serde::{Deserialize, Serialize};

pub use points::{GenerateSpec, PixelRect, PointGenError, generate_points};
pub use status::{AnnotationCounts, Status, VerboseStatus};

/// One sample point on an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// 1-based point number; ordering is significant
    pub number: u32,
    /// Pixel row (y)
    pub row: u32,
    /// Pixel column (x)
    pub column: u32,
    /// CPCe's display label when the point came from a CPC upload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_label: Option<String>,
}

/// Who produced an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    /// Suggested by the automatic classifier; unconfirmed
    Machine,
    /// Made or confirmed by a human
    Human,
}

/// A label applied to one point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Label code as it appears in the source's label set
    pub label_code: String,
    pub kind: AnnotationKind,
}
