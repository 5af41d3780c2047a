//! Per-image annotation status derivation
//!
//! Pure combinatorial lookup over the three point counts of an image.

use serde::{Deserialize, Serialize};

/// Coarse per-image annotation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Unclassified,
    Unconfirmed,
    Confirmed,
}

/// Finer-grained status for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerboseStatus {
    NotStarted,
    Unconfirmed,
    PartiallyConfirmed,
    Confirmed,
}

/// Point counts backing the status derivation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationCounts {
    /// Points with no annotation
    pub unclassified: usize,
    /// Points carrying an unconfirmed machine annotation
    pub unconfirmed: usize,
    /// Points carrying a human-confirmed annotation
    pub confirmed: usize,
}

impl AnnotationCounts {
    pub fn total(&self) -> usize {
        self.unclassified + self.unconfirmed + self.confirmed
    }

    /// Coarse status. An image is confirmed only once every point carries a
    /// human annotation, and unconfirmed only once every point is annotated
    /// at all.
    pub fn status(&self) -> Status {
        if self.unclassified > 0 || self.total() == 0 {
            Status::Unclassified
        } else if self.unconfirmed > 0 {
            Status::Unconfirmed
        } else {
            Status::Confirmed
        }
    }

    /// Verbose status
    pub fn verbose_status(&self) -> VerboseStatus {
        if self.confirmed > 0 {
            if self.unclassified == 0 && self.unconfirmed == 0 {
                VerboseStatus::Confirmed
            } else {
                VerboseStatus::PartiallyConfirmed
            }
        } else if self.unconfirmed > 0 {
            VerboseStatus::Unconfirmed
        } else {
            VerboseStatus::NotStarted
        }
    }
}
