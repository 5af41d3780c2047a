//! Reefpoint Server Library
//!
//! This module exports the server components for use in integration tests
//! and external tooling.

pub mod annotation;
pub mod config;
pub mod cpc;
pub mod export;
pub mod labels;
pub mod source;
pub mod state;
pub mod upload;

// Re-export commonly used types
pub use config::Config;
pub use cpc::{CpcDocument, CpcError, CpcParser};
pub use export::export_routes;
pub use labels::{CodePolicy, Label, LabelSet};
pub use source::{SourceError, SourceStore, source_routes};
pub use state::AppState;
pub use upload::upload_routes;
