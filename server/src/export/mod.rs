//! Annotation export module
//!
//! CPC and CSV exports of an image's points and annotations.

pub mod builder;
pub mod csv;
pub mod routes;

pub use builder::{CPC_UNITS_PER_PIXEL, build_cpc};
pub use csv::annotations_csv;
pub use routes::export_routes;
