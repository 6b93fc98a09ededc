use thiserror::Error;

use crate::image_pipeline::raw::CfaColor;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to decode raw image: {0}")]
    DecodeError(String),

    #[error("Failed to encode DNG image: {0}")]
    EncodeError(String),

    #[error("Failed to read EXIF metadata: {0}")]
    MetadataError(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Color {0:?} not found in CFA pattern")]
    ColorNotFound(CfaColor),

    #[error("Invalid CFA offset ({row}, {col}) for period {period}")]
    InvalidOffset { row: usize, col: usize, period: usize },

    #[error("Channel grid shape {actual:?} does not match target {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("{color:?} samples were taken at {actual:?} but the base pattern has it at {expected:?}")]
    PatternMismatch {
        color: CfaColor,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("CFA positions for {0:?} were already written")]
    DuplicateWrite(CfaColor),

    #[error("Merged buffer is missing channels: {0:?}")]
    IncompleteMerge(Vec<CfaColor>),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
