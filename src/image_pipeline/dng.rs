//! DNG output module
//!
//! Assembles the merged mosaic and its metadata into a `CaptureArtifact` and
//! serializes it as a single-page CFA DNG.

mod artifact;
mod writer;
mod standard_dng_writer;
pub mod tags;
pub mod types;

pub use artifact::CaptureArtifact;
pub use writer::DngWriter;
pub use standard_dng_writer::StandardDngWriter;
pub use types::{DngConfig, DngConfigBuilder};
