//! TIFF/DNG tag numbers written by the DNG writer.

pub const NEW_SUBFILE_TYPE: u16 = 254;
pub const PHOTOMETRIC_INTERPRETATION: u16 = 262;
pub const CFA_REPEAT_PATTERN_DIM: u16 = 33421;
pub const CFA_PATTERN: u16 = 33422;
pub const DNG_VERSION: u16 = 50706;
pub const DNG_BACKWARD_VERSION: u16 = 50707;
pub const UNIQUE_CAMERA_MODEL: u16 = 50708;
pub const BLACK_LEVEL_REPEAT_DIM: u16 = 50713;
pub const BLACK_LEVEL: u16 = 50714;
pub const WHITE_LEVEL: u16 = 50717;
pub const COLOR_MATRIX_1: u16 = 50721;
pub const AS_SHOT_NEUTRAL: u16 = 50728;
pub const CALIBRATION_ILLUMINANT_1: u16 = 50778;

/// PhotometricInterpretation value for color filter array data.
pub const PHOTOMETRIC_CFA: u16 = 32803;

/// Calibration illuminant code for D65.
pub const ILLUMINANT_D65: u16 = 21;

/// Denominator used for fixed-precision matrix rationals.
pub const MATRIX_DENOMINATOR: i32 = 10000;
