//! DNG output configuration types

use crate::image_pipeline::dng::tags::ILLUMINANT_D65;

/// Configuration for DNG assembly and writing
#[derive(Debug, Clone)]
pub struct DngConfig {
    /// Value of the CalibrationIlluminant1 tag
    pub calibration_illuminant: u16,
    /// DNGVersion and DNGBackwardVersion
    pub dng_version: [u8; 4],
    /// Fold the second green code onto the first in the CFAPattern tag
    pub remap_green_alt: bool,
    /// Subtract black levels from the samples instead of only tagging them
    pub subtract_black_level: bool,
    /// Whether to validate image dimensions before writing
    pub validate_dimensions: bool,
}

impl Default for DngConfig {
    fn default() -> Self {
        Self {
            calibration_illuminant: ILLUMINANT_D65,
            dng_version: [1, 4, 0, 0],
            remap_green_alt: true,
            subtract_black_level: false,
            validate_dimensions: true,
        }
    }
}

impl DngConfig {
    pub fn builder() -> DngConfigBuilder {
        DngConfigBuilder::default()
    }
}

/// Builder for DngConfig
#[derive(Default)]
pub struct DngConfigBuilder {
    calibration_illuminant: Option<u16>,
    dng_version: Option<[u8; 4]>,
    remap_green_alt: Option<bool>,
    subtract_black_level: Option<bool>,
    validate_dimensions: Option<bool>,
}

impl DngConfigBuilder {
    pub fn calibration_illuminant(mut self, illuminant: u16) -> Self {
        self.calibration_illuminant = Some(illuminant);
        self
    }

    pub fn dng_version(mut self, version: [u8; 4]) -> Self {
        self.dng_version = Some(version);
        self
    }

    pub fn remap_green_alt(mut self, remap: bool) -> Self {
        self.remap_green_alt = Some(remap);
        self
    }

    pub fn subtract_black_level(mut self, subtract: bool) -> Self {
        self.subtract_black_level = Some(subtract);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn build(self) -> DngConfig {
        let default = DngConfig::default();
        DngConfig {
            calibration_illuminant: self.calibration_illuminant.unwrap_or(default.calibration_illuminant),
            dng_version: self.dng_version.unwrap_or(default.dng_version),
            remap_green_alt: self.remap_green_alt.unwrap_or(default.remap_green_alt),
            subtract_black_level: self.subtract_black_level.unwrap_or(default.subtract_black_level),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
        }
    }
}
