//! RAW image reader implementation using the rawloader library.
//!
//! This module decodes camera raw files (ARW, CR2, NEF, DNG, ...) into a
//! `RawCapture`: the sample grid at full sensor bit depth, the CFA layout, the
//! calibration levels and the preserved EXIF fields.

use std::io::Cursor;

use ndarray::Array2;
use tracing::{debug, warn};
use rawloader::RawImageData as RawloaderImageData;
use crate::image_pipeline::common::error::{Result, PipelineError};
use crate::image_pipeline::raw::cfa::{CfaColor, CfaPattern, CFA_PERIOD};
use crate::image_pipeline::raw::metadata::ExifSubset;
use crate::image_pipeline::raw::types::{Calibration, RawCapture};
use crate::image_pipeline::raw::reader::RawImageReader;

/// RAW image reader that uses the rawloader library for decoding.
///
/// Only single-component, 2x2-period CFA sensors are accepted.
pub struct RawLoaderReader;

/// Default bit depth when no white level information is available from the RAW file.
const DEFAULT_BITS_PER_SAMPLE: u32 = 16;

/// The bit width of the u16 data type, used for calculating actual bits per sample.
const U16_BITS: u32 = 16;

impl RawImageReader for RawLoaderReader {
    /// Reads and decodes a raw capture from a byte array.
    ///
    /// Samples stay unsigned 16-bit at sensor bit depth; no levels are applied.
    /// EXIF problems are logged and leave the subset empty rather than failing
    /// the decode.
    fn read_raw(&self, data: &[u8]) -> Result<RawCapture> {
        debug!("Decoding RAW image, {} bytes", data.len());

        let decoded = rawloader::decode(&mut Cursor::new(data))
            .map_err(|e| PipelineError::DecodeError(e.to_string()))?;

        let width = decoded.width;
        let height = decoded.height;

        debug!("Decoded image: {}x{} ({} {})", width, height, decoded.make, decoded.model);

        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimensions(width, height));
        }
        if decoded.cpp != 1 {
            return Err(PipelineError::UnsupportedFormat(format!(
                "{} components per pixel, expected a CFA mosaic",
                decoded.cpp
            )));
        }
        if decoded.cfa.width != CFA_PERIOD || decoded.cfa.height != CFA_PERIOD {
            return Err(PipelineError::UnsupportedFormat(format!(
                "{}x{} CFA pattern {}",
                decoded.cfa.width, decoded.cfa.height, decoded.cfa.name
            )));
        }
        let cfa = cfa_from_sensor_colors(|row, col| decoded.cfa.color_at(row, col))?;
        debug!("CFA pattern: {}", cfa);

        // Integer data is cast directly, float data (normalized 0.0-1.0) is scaled to u16 range
        let samples: Vec<u16> = match decoded.data {
            RawloaderImageData::Integer(values) => {
                values.iter().map(|&v| v as u16).collect()
            }
            RawloaderImageData::Float(values) => {
                values.iter().map(|&v| (v * u16::MAX as f32) as u16).collect()
            }
        };
        let grid = Array2::from_shape_vec((height, width), samples)
            .map_err(|_| PipelineError::InvalidDimensions(width, height))?;

        // The white level tells us the sensor's real bit depth (12, 14, 16 ...)
        let max_white_level = decoded.whitelevels.iter().max().copied().unwrap_or(u16::MAX);
        let bits_per_sample = if max_white_level == 0 {
            DEFAULT_BITS_PER_SAMPLE
        } else {
            U16_BITS - max_white_level.leading_zeros()
        };

        debug!("Calculated bits_per_sample: {} (max white level: {})", bits_per_sample, max_white_level);

        let exif = ExifSubset::from_raw_bytes(data).unwrap_or_else(|e| {
            warn!("No EXIF metadata carried over: {}", e);
            ExifSubset::default()
        });

        Ok(RawCapture {
            data: grid,
            bits_per_sample,
            cfa,
            calibration: Calibration {
                white_level: max_white_level,
                black_levels: decoded.blacklevels,
                wb_coeffs: decoded.wb_coeffs,
                xyz_to_cam: decoded.xyz_to_cam,
                make: decoded.make,
                model: decoded.model,
            },
            exif,
        })
    }
}

/// Builds a `CfaPattern` from per-site color indices (R=0, G=1, B=2, E/G2=3).
///
/// Decoders that report both greens as 1 get the second one promoted to
/// `GreenAlt`; the result must hold every color exactly once.
fn cfa_from_sensor_colors<F>(color_at: F) -> Result<CfaPattern>
where
    F: Fn(usize, usize) -> usize,
{
    let mut cells = [[CfaColor::Red; CFA_PERIOD]; CFA_PERIOD];
    let mut seen_green = false;
    for row in 0..CFA_PERIOD {
        for col in 0..CFA_PERIOD {
            cells[row][col] = match color_at(row, col) {
                0 => CfaColor::Red,
                1 if !seen_green => {
                    seen_green = true;
                    CfaColor::Green
                }
                1 | 3 => CfaColor::GreenAlt,
                2 => CfaColor::Blue,
                other => {
                    return Err(PipelineError::UnsupportedFormat(format!(
                        "CFA color index {other}"
                    )))
                }
            };
        }
    }

    let pattern = CfaPattern::new(cells);
    for color in CfaColor::ALL {
        let count = pattern.positions().filter(|&(r, c)| pattern.color_at(r, c) == color).count();
        if count != 1 {
            return Err(PipelineError::UnsupportedFormat(format!(
                "CFA pattern {pattern} is not a Bayer layout"
            )));
        }
    }
    Ok(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_grid(grid: [[usize; 2]; 2]) -> Result<CfaPattern> {
        cfa_from_sensor_colors(|r, c| grid[r][c])
    }

    #[test]
    fn test_second_green_is_promoted() {
        let pattern = from_grid([[0, 1], [1, 2]]).unwrap();
        assert_eq!(pattern, CfaPattern::RGGB);
    }

    #[test]
    fn test_explicit_second_green_code() {
        let pattern = from_grid([[1, 0], [2, 3]]).unwrap();
        assert_eq!(pattern.codes(), [[1, 0], [2, 3]]);
    }

    #[test]
    fn test_rejects_non_bayer_layouts() {
        assert!(from_grid([[0, 0], [1, 2]]).is_err());
        assert!(from_grid([[0, 1], [1, 1]]).is_err());
        assert!(from_grid([[0, 1], [5, 2]]).is_err());
    }

    #[test]
    fn test_rejects_garbage_bytes() {
        let result = RawLoaderReader.read_raw(b"not a raw file");
        assert!(matches!(result, Err(PipelineError::DecodeError(_))));
    }
}
