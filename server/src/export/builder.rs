//! Building CPC documents for export
//!
//! An image that came from a CPC upload round-trips the preserved fields of
//! that file (codes path, image path, dimensions, annotation area, headers).
//! An image born on this side gets a document synthesized from its pixel
//! dimensions at the nominal CPCe scale.

use crate::config::CpcConfig;
use crate::cpc::{CpcCorner, CpcDocument, CpcPoint};
use crate::labels::CodePolicy;
use crate::labels::mapping::split_code;
use crate::source::types::{ImageRecord, StoredCpc};

/// Nominal CPC coordinate units per pixel, used for from-scratch documents
pub const CPC_UNITS_PER_PIXEL: u32 = 15;

/// Build a CPC document for an image's current points and annotations.
pub fn build_cpc(image: &ImageRecord, policy: CodePolicy, config: &CpcConfig) -> CpcDocument {
    match &image.cpc {
        Some(stored) => from_stored(image, stored, policy),
        None => from_scratch(image, policy, config),
    }
}

fn from_stored(image: &ImageRecord, stored: &StoredCpc, policy: CodePolicy) -> CpcDocument {
    let points = image
        .points
        .iter()
        .map(|p| {
            let (id, notes) = label_fields(image, p.number, policy);
            CpcPoint {
                x: to_units(p.column, stored.image_width, image.width),
                y: to_units(p.row, stored.image_height, image.height),
                number_label: display_label(image, p.number),
                id,
                notes,
            }
        })
        .collect();

    CpcDocument {
        code_filepath: stored.code_filepath.clone(),
        image_filepath: stored.image_filepath.clone(),
        image_width: stored.image_width,
        image_height: stored.image_height,
        display_width: stored.display_width.clone(),
        display_height: stored.display_height.clone(),
        annotation_area: stored.annotation_area.clone(),
        points,
        // Preserved as uploaded; an older-version file keeps its short set.
        headers: stored.headers.clone(),
    }
}

fn from_scratch(image: &ImageRecord, policy: CodePolicy, config: &CpcConfig) -> CpcDocument {
    let width_units = image.width * CPC_UNITS_PER_PIXEL;
    let height_units = image.height * CPC_UNITS_PER_PIXEL;

    let points = image
        .points
        .iter()
        .map(|p| {
            let (id, notes) = label_fields(image, p.number, policy);
            CpcPoint {
                x: p.column as i64 * CPC_UNITS_PER_PIXEL as i64,
                y: p.row as i64 * CPC_UNITS_PER_PIXEL as i64,
                number_label: display_label(image, p.number),
                id,
                notes,
            }
        })
        .collect();

    let mut doc = CpcDocument {
        code_filepath: config.code_filepath.clone(),
        image_filepath: windows_image_path(&config.image_dir, &image.name),
        image_width: width_units,
        image_height: height_units,
        display_width: image.width.to_string(),
        display_height: image.height.to_string(),
        annotation_area: [
            CpcCorner::new("0", height_units.to_string()),
            CpcCorner::new(width_units.to_string(), height_units.to_string()),
            CpcCorner::new(width_units.to_string(), "0"),
            CpcCorner::new("0", "0"),
        ],
        points,
        headers: Vec::new(),
    };
    doc.pad_headers();
    doc
}

fn label_fields(image: &ImageRecord, point_number: u32, policy: CodePolicy) -> (String, String) {
    match image.annotations.get(&point_number) {
        Some(annotation) => split_code(&annotation.label_code, policy),
        None => (String::new(), String::new()),
    }
}

fn display_label(image: &ImageRecord, point_number: u32) -> String {
    image
        .points
        .iter()
        .find(|p| p.number == point_number)
        .and_then(|p| p.display_label.clone())
        .unwrap_or_else(|| point_number.to_string())
}

/// Rescale a pixel coordinate back into a document's unit space, rounding
/// to nearest.
fn to_units(pixel: u32, cpc_dim: u32, image_dim: u32) -> i64 {
    (pixel as f64 * cpc_dim as f64 / image_dim as f64).round() as i64
}

/// Synthesize the Windows-side path CPCe expects for an image name.
fn windows_image_path(image_dir: &str, name: &str) -> String {
    format!(
        "{}\\{}",
        image_dir.trim_end_matches('\\'),
        name.replace('/', "\\")
    )
}
