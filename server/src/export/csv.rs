//! CSV export of annotations

use crate::source::types::ImageRecord;

/// Render annotations as CSV: one row per annotated point.
///
/// Callers pass images already sorted; points emit in number order.
/// Unannotated points are omitted.
pub fn annotations_csv(images: &[ImageRecord]) -> String {
    let mut out = String::from("Name,Row,Column,Label\r\n");
    for image in images {
        for point in &image.points {
            let Some(annotation) = image.annotations.get(&point.number) else {
                continue;
            };
            out.push_str(&format!(
                "{},{},{},{}\r\n",
                csv_field(&image.name),
                point.row,
                point.column,
                csv_field(&annotation.label_code)
            ));
        }
    }
    out
}

/// Quote a field when it contains a delimiter, quote, or line break;
/// embedded quotes double per CSV convention.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
