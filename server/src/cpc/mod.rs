//! CPC file processing module
//!
//! Parsing, serialization, and image matching for the CPC point-count file
//! format used by the CPCe desktop tool.

pub mod matching;
pub mod parser;
pub mod types;
pub mod writer;

pub use matching::find_matching_image;
pub use parser::{CpcParser, ParsedCpc};
pub use types::{CpcCorner, CpcDocument, CpcError, CpcPoint};
