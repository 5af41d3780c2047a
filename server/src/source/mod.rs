//! Source module
//!
//! The in-memory registry of survey images, points, annotations, and the
//! label set, plus local image discovery and the source HTTP API.

pub mod local;
pub mod routes;
pub mod store;
pub mod types;

pub use routes::{SourceErrorResponse, source_routes};
pub use store::SourceStore;
pub use types::{CpcImport, ImageRecord, ImageSummary, SourceError, StoredCpc};
