//! RAW capture data types

use ndarray::Array2;

use crate::image_pipeline::raw::cfa::{CfaColor, CfaPattern};
use crate::image_pipeline::raw::metadata::ExifSubset;

/// Sensor calibration carried alongside the samples
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    /// Saturation level of the sensor
    pub white_level: u16,
    /// Black level per color, indexed by `CfaColor::index()`
    pub black_levels: [u16; 4],
    /// As-shot white balance coefficients (R, G, B, second G)
    pub wb_coeffs: [f32; 4],
    /// XYZ to camera transform, one row per color plus a spare fourth row
    pub xyz_to_cam: [[f32; 3]; 4],
    pub make: String,
    pub model: String,
}

impl Calibration {
    pub fn black_level(&self, color: CfaColor) -> u16 {
        self.black_levels[color.index()]
    }

    /// The 3x3 color matrix: `xyz_to_cam` without its last row.
    pub fn color_matrix(&self) -> [[f32; 3]; 3] {
        [self.xyz_to_cam[0], self.xyz_to_cam[1], self.xyz_to_cam[2]]
    }
}

/// One decoded raw file
#[derive(Debug, Clone)]
pub struct RawCapture {
    /// Raw sample grid (single channel Bayer mosaic), shape `(height, width)`
    pub data: Array2<u16>,
    /// Actual bits per sample from the sensor (e.g., 12, 14, or 16)
    pub bits_per_sample: u32,
    pub cfa: CfaPattern,
    pub calibration: Calibration,
    /// Subset of EXIF fields worth carrying into the merged file
    pub exif: ExifSubset,
}

impl RawCapture {
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}
