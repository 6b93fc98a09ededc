//! RAW capture reading module
//!
//! Format-agnostic decoding of a camera raw file into its sample grid, CFA
//! layout, calibration levels and the EXIF fields carried into the output.

mod reader;
mod rawloader_reader;
pub mod cfa;
pub mod metadata;
pub mod types;

pub use reader::RawImageReader;
pub use rawloader_reader::RawLoaderReader;
pub use cfa::{CfaColor, CfaPattern, CFA_PERIOD};
pub use metadata::{ExifEntry, ExifSubset, ExifValue, PRESERVED_TAGS};
pub use types::{Calibration, RawCapture};
