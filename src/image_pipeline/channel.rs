//! Raw channel extraction module
//!
//! Locates a CFA color within the repeat pattern and pulls out the strided
//! sub-grid of samples belonging to it.

mod extractor;
pub mod types;

pub use extractor::{extract, extract_color, locate_color};
pub use types::ChannelGrid;
