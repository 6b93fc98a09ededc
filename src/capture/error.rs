use thiserror::Error;

use crate::camera::CameraError;
use crate::capture::types::CaptureState;
use crate::image_pipeline::PipelineError;
use crate::light::LightError;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error(transparent)]
    Light(#[from] LightError),

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Failed to write output: {0}")]
    OutputWriteError(String),
}

/// A capture sequence that stopped in `state`.
///
/// Devices acquired before the failure have already been released by the
/// time this is returned. Nothing is retried; a new run starts from `Init`.
#[derive(Error, Debug)]
#[error("Capture failed while {state}: {error}")]
pub struct CaptureFailure {
    pub state: CaptureState,
    #[source]
    pub error: CaptureError,
}

impl CaptureFailure {
    /// True when the light never showed up during the scan.
    pub fn is_device_not_found(&self) -> bool {
        matches!(self.error, CaptureError::Light(LightError::DeviceNotFound))
    }
}

pub type CaptureResult<T> = std::result::Result<T, CaptureFailure>;
