//! CPC-related types and error definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard limits for CPC parsing
pub mod limits {
    /// Maximum accepted `.cpc` file size in bytes
    pub const MAX_CPC_SIZE_BYTES: u64 = 512 * 1024;
    /// Maximum number of points in a single `.cpc` file
    pub const MAX_POINTS: u64 = 10_000;
    /// CPCe 4.1 writes exactly this many trailing header lines
    pub const HEADER_LINES: usize = 28;
}

/// Errors that can occur when reading or writing CPC files
#[derive(Debug, Error)]
pub enum CpcError {
    /// The stream ran out before a required line; there is no line to point to.
    #[error("File seems to have too few lines")]
    TooFewLines,

    /// A structural violation at a specific 1-based line of the file.
    #[error("Line {line}: {message}")]
    Line { line: usize, message: String },

    #[error("File too large: {size} bytes (max {max})")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Too many points: {count} (max {max})")]
    TooManyPoints { count: u64, max: u64 },

    #[error("File is not valid UTF-8 text")]
    Encoding,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// One corner of the annotation-area boundary.
///
/// Coordinates are carried as opaque strings: the application only ever
/// round-trips them, and reparsing would introduce floating-point drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpcCorner {
    pub x: String,
    pub y: String,
}

impl CpcCorner {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
}

/// One sample point in a CPC document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpcPoint {
    /// X position in CPC coordinate units
    pub x: i64,
    /// Y position in CPC coordinate units
    pub y: i64,
    /// CPCe's own display label for the point (a number or letter); preserved, unused
    pub number_label: String,
    /// The label "ID" field
    pub id: String,
    /// Optional secondary code
    pub notes: String,
}

/// In-memory representation of one `.cpc` file
///
/// Constructed transiently: built from an uploaded stream, or assembled for
/// an export. Never persisted as a whole; only derived fields are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpcDocument {
    /// Path to the external CPCe "codes" file; opaque, preserved verbatim
    pub code_filepath: String,
    /// Windows-style path identifying the source image
    pub image_filepath: String,
    /// Image width in CPC units (nominally 1/15 px; the scale is derived, not assumed)
    pub image_width: u32,
    /// Image height in CPC units
    pub image_height: u32,
    /// Cosmetic display width; opaque passthrough
    pub display_width: String,
    /// Cosmetic display height; opaque passthrough
    pub display_height: String,
    /// Boundary corners in fixed order: bottom-left, bottom-right, top-right, top-left
    pub annotation_area: [CpcCorner; 4],
    /// Sample points; order defines point numbering
    pub points: Vec<CpcPoint>,
    /// Free-form trailing metadata lines, 0 to 28; preserved as given
    pub headers: Vec<String>,
}

impl CpcDocument {
    /// Pad `headers` with empty strings up to the 28 lines CPCe 4.1 expects.
    ///
    /// Headers read from an older-version file are preserved as given; callers
    /// producing CPCe-compatible output pad before serializing.
    pub fn pad_headers(&mut self) {
        while self.headers.len() < limits::HEADER_LINES {
            self.headers.push(String::new());
        }
    }
}
