//! Conversion between a CPC point's (id, notes) pair and a single label code
//!
//! Two user-selectable conventions exist in the field: label sets that use
//! the CPCe ID alone, and label sets that fold the Notes code into the label
//! code with a `+` separator.

use serde::{Deserialize, Serialize};

/// How a CPC (id, notes) pair maps to a label code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodePolicy {
    /// Label code is the ID field; notes are ignored on import, blank on export
    IdOnly,
    /// Non-empty notes append to the ID as `id+notes`
    IdAndNotes,
}

/// Map a CPC point's id and notes fields to a label code
pub fn code_for_point(id: &str, notes: &str, policy: CodePolicy) -> String {
    match policy {
        CodePolicy::IdOnly => id.to_string(),
        CodePolicy::IdAndNotes => {
            if notes.is_empty() {
                id.to_string()
            } else {
                format!("{}+{}", id, notes)
            }
        }
    }
}

/// Split a label code back into CPC (id, notes) fields.
///
/// Under [`CodePolicy::IdAndNotes`] the code splits on the first `+`;
/// otherwise the whole code is the id and notes are blank.
pub fn split_code(code: &str, policy: CodePolicy) -> (String, String) {
    match policy {
        CodePolicy::IdOnly => (code.to_string(), String::new()),
        CodePolicy::IdAndNotes => match code.split_once('+') {
            Some((id, notes)) => (id.to_string(), notes.to_string()),
            None => (code.to_string(), String::new()),
        },
    }
}
