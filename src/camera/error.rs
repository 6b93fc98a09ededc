use thiserror::Error;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open camera: {0}")]
    Open(String),

    #[error("Shutter speed {requested} is not offered by the camera (choices: {choices})")]
    UnsupportedShutterSpeed { requested: String, choices: String },

    #[error("Invalid shutter speed: {0}")]
    InvalidShutterSpeed(String),

    #[error("Camera does not expose setting `{0}`")]
    MissingSetting(String),

    #[error("Capture target {0} is not offered by the camera")]
    UnsupportedCaptureTarget(String),

    #[error("Failed to apply camera configuration: {0}")]
    Configuration(String),

    #[error("Camera must be configured before capturing")]
    NotConfigured,

    #[error("Camera session is closed")]
    Closed,

    #[error("Capture transport error: {0}")]
    CaptureTransport(String),

    #[error("Camera control unavailable: built without `{0}` support")]
    Unsupported(&'static str),
}

pub type CameraResult<T> = std::result::Result<T, CameraError>;
