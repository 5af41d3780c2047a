//! Label sets and label-code mapping

pub mod mapping;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use mapping::CodePolicy;

/// Errors from label-set construction
#[derive(Debug, Error)]
pub enum LabelSetError {
    #[error("Duplicate label code: {0}")]
    DuplicateCode(String),

    #[error("Label code may not be empty")]
    EmptyCode,
}

/// One label within a label set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Human-readable name, e.g. "Pocillopora"
    pub name: String,
    /// Short code, e.g. "POC"; unique within the set, case-insensitively
    pub code: String,
}

/// An ordered collection of labels with case-insensitive code lookup
#[derive(Debug, Clone, Default)]
pub struct LabelSet {
    /// Keyed by lowercased code; insertion order is the display order
    labels: IndexMap<String, Label>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a label set, rejecting empty or (case-insensitively) duplicate codes
    pub fn from_labels(labels: Vec<Label>) -> Result<Self, LabelSetError> {
        let mut set = Self::new();
        for label in labels {
            if label.code.trim().is_empty() {
                return Err(LabelSetError::EmptyCode);
            }
            let key = label.code.to_lowercase();
            if set.labels.contains_key(&key) {
                return Err(LabelSetError::DuplicateCode(label.code));
            }
            set.labels.insert(key, label);
        }
        Ok(set)
    }

    /// Case-insensitive code lookup
    pub fn lookup(&self, code: &str) -> Option<&Label> {
        self.labels.get(&code.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.values()
    }
}
