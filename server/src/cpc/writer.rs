//! CPC writer
//!
//! Serialization is deterministic and byte-for-byte reproducible for a given
//! document, so round-trip tests and diffs of previously-uploaded files
//! against fresh exports are exact. Every line ends with CRLF regardless of
//! platform; the consuming tool is Windows-only.

use super::types::CpcDocument;

/// Serialize a document to CPC text.
///
/// Headers are emitted for exactly the headers present on the document;
/// callers wanting CPCe-4.1-compatible output call
/// [`CpcDocument::pad_headers`] first.
pub fn serialize(doc: &CpcDocument) -> String {
    let mut out = String::new();

    push_line(
        &mut out,
        &[
            quoted(&doc.code_filepath),
            quoted(&doc.image_filepath),
            doc.image_width.to_string(),
            doc.image_height.to_string(),
            doc.display_width.clone(),
            doc.display_height.clone(),
        ],
    );

    for corner in &doc.annotation_area {
        push_line(&mut out, &[corner.x.clone(), corner.y.clone()]);
    }

    push_line(&mut out, &[doc.points.len().to_string()]);

    for point in &doc.points {
        push_line(&mut out, &[point.x.to_string(), point.y.to_string()]);
    }

    for point in &doc.points {
        push_line(
            &mut out,
            &[
                quoted(&point.number_label),
                quoted(&point.id),
                quoted("Notes"),
                quoted(&point.notes),
            ],
        );
    }

    for header in &doc.headers {
        push_line(&mut out, &[quoted(header)]);
    }

    out
}

fn push_line(out: &mut String, tokens: &[String]) {
    out.push_str(&tokens.join(","));
    out.push_str("\r\n");
}

/// Wrap a value in double quotes, stripping any embedded quote characters
/// first. The format has no escape mechanism for quotes, so the writer must
/// guarantee none remain in the value.
fn quoted(value: &str) -> String {
    let cleaned: String = value.chars().filter(|c| *c != '"').collect();
    format!("\"{}\"", cleaned)
}
