//! Tethered camera session
//!
//! Configuration (capture target, exact shutter speed), frame capture with
//! retrieve-then-delete semantics, and event queue draining.

mod config;
mod error;
#[cfg(feature = "gphoto")]
mod gphoto_session;
mod session;
mod shutter;

pub use config::{CameraConfigRequest, CaptureTarget, ResolvedCameraConfig};
pub use error::{CameraError, CameraResult};
pub use session::{
    drain_events, CameraConnector, CameraEvent, CameraSession, CapturedFile,
    DEFAULT_EVENT_TIMEOUT, MAX_DRAINED_EVENTS,
};
pub use shutter::{select_shutter_speed, ShutterSpeed, BULB};

#[cfg(feature = "gphoto")]
pub use gphoto_session::{GphotoConnector, GphotoSession};

// Fallback types when built without libgphoto2
#[cfg(not(feature = "gphoto"))]
pub struct GphotoConnector;

#[cfg(not(feature = "gphoto"))]
impl GphotoConnector {
    pub fn new(_event_timeout: std::time::Duration) -> Self {
        Self
    }
}

/// Session handle that can never be constructed.
#[cfg(not(feature = "gphoto"))]
pub enum GphotoSession {}

#[cfg(not(feature = "gphoto"))]
impl CameraConnector for GphotoConnector {
    type Session = GphotoSession;

    fn open(&mut self) -> CameraResult<GphotoSession> {
        Err(CameraError::Unsupported("gphoto"))
    }
}

#[cfg(not(feature = "gphoto"))]
impl CameraSession for GphotoSession {
    fn configure(&mut self, _request: &CameraConfigRequest) -> CameraResult<ResolvedCameraConfig> {
        match *self {}
    }

    fn capture_frame(&mut self) -> CameraResult<CapturedFile> {
        match *self {}
    }

    fn close(&mut self) -> CameraResult<()> {
        match *self {}
    }
}
