//! CPC upload module
//!
//! Batch parsing, image matching, label mapping, and all-or-nothing commit
//! of uploaded CPC files.

pub mod batch;
pub mod routes;

pub use batch::{CpcUploadFile, UploadError, UploadOutcome, UploadedFile, process_batch};
pub use routes::upload_routes;
