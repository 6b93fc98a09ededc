use ndarray::Array2;
use tracing::debug;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::dng::tags::MATRIX_DENOMINATOR;
use crate::image_pipeline::dng::types::DngConfig;
use crate::image_pipeline::merge::MergedRawBuffer;
use crate::image_pipeline::raw::{ExifSubset, RawCapture, CFA_PERIOD};

/// Everything the DNG writer needs: the merged mosaic plus its tags.
#[derive(Debug, Clone)]
pub struct CaptureArtifact {
    /// Merged Bayer mosaic, shape `(height, width)`
    pub mosaic: Array2<u16>,
    /// CFAPattern codes per cell, after the optional green remap
    pub cfa_pattern: [[u8; CFA_PERIOD]; CFA_PERIOD],
    /// Black level per CFA cell
    pub black_levels: [[u16; CFA_PERIOD]; CFA_PERIOD],
    pub white_level: u16,
    /// Carried from the last capture. It describes the camera's own filters,
    /// not the light's primaries, so it is only a starting point for raw processors.
    pub color_matrix: [[f32; 3]; 3],
    /// Make and model joined by a space
    pub unique_camera_model: String,
    pub exif: ExifSubset,
}

impl CaptureArtifact {
    /// Finishes `merged` and attaches the calibration and EXIF of `last`, the
    /// capture whose metadata stands for the whole file.
    pub fn assemble(mut merged: MergedRawBuffer, last: &RawCapture, config: &DngConfig) -> Result<Self> {
        if !merged.is_complete() {
            return Err(PipelineError::IncompleteMerge(merged.missing()));
        }

        let cfa = *merged.cfa();
        let cfa_pattern = if config.remap_green_alt {
            cfa.remapped_codes()
        } else {
            cfa.codes()
        };

        let calibration = &last.calibration;
        let mut black_levels = [[0u16; CFA_PERIOD]; CFA_PERIOD];
        for (row, col) in cfa.positions() {
            black_levels[row][col] = calibration.black_levels[cfa_pattern[row][col] as usize];
        }

        let mut white_level = calibration.white_level;
        if config.subtract_black_level {
            merged.subtract_black_levels(black_levels);
            let sum: u32 = black_levels.iter().flatten().map(|&b| b as u32).sum();
            let mean = (sum / (CFA_PERIOD * CFA_PERIOD) as u32) as u16;
            white_level = white_level.saturating_sub(mean);
            black_levels = [[0; CFA_PERIOD]; CFA_PERIOD];
            debug!(white_level, "Applied black level correction");
        }

        let unique_camera_model = match (last.exif.make(), last.exif.model()) {
            (Some(make), Some(model)) => format!("{make} {model}"),
            _ => format!("{} {}", calibration.make, calibration.model),
        };

        Ok(Self {
            mosaic: merged.into_mosaic()?,
            cfa_pattern,
            black_levels,
            white_level,
            color_matrix: calibration.color_matrix(),
            unique_camera_model,
            exif: last.exif.clone(),
        })
    }

    pub fn width(&self) -> usize {
        self.mosaic.ncols()
    }

    pub fn height(&self) -> usize {
        self.mosaic.nrows()
    }

    /// Color matrix entries as `(numerator, denominator)` with a fixed
    /// denominator of 10000, row-major. Numerators are truncated toward zero.
    pub fn color_matrix_rationals(&self) -> Vec<(i32, i32)> {
        self.color_matrix
            .iter()
            .flatten()
            .map(|&v| ((v * MATRIX_DENOMINATOR as f32) as i32, MATRIX_DENOMINATOR))
            .collect()
    }
}
