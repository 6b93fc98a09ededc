use std::path::Path;
use std::time::Duration;

use tracing::warn;

use crate::camera::config::{CameraConfigRequest, ResolvedCameraConfig};
use crate::camera::error::CameraResult;

/// Default timeout for a single event poll while draining the queue.
pub const DEFAULT_EVENT_TIMEOUT: Duration = Duration::from_millis(10);

/// Upper bound on events consumed by one drain, in case the camera never goes quiet.
pub const MAX_DRAINED_EVENTS: usize = 64;

/// A raw file pulled off the camera. The camera-side copy is already deleted.
#[derive(Debug, Clone)]
pub struct CapturedFile {
    pub folder: String,
    pub name: String,
    pub data: Vec<u8>,
}

impl CapturedFile {
    /// File extension as reported by the camera (e.g. `ARW`).
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.name).extension().and_then(|ext| ext.to_str())
    }
}

/// What a single poll of the camera's event queue returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraEvent {
    /// Nothing arrived within the poll timeout
    Timeout,
    /// The camera announced a new file
    FileAdded { folder: String, name: String },
    /// Anything else; logged and discarded
    Other(String),
}

/// Opens a tethered camera.
pub trait CameraConnector {
    type Session: CameraSession;

    fn open(&mut self) -> CameraResult<Self::Session>;
}

/// An open tethered camera.
///
/// `configure` must succeed before `capture_frame` is called; captures are
/// strictly sequential.
pub trait CameraSession {
    fn configure(&mut self, request: &CameraConfigRequest) -> CameraResult<ResolvedCameraConfig>;

    /// Triggers an exposure, downloads the file, deletes it from the camera and
    /// drains the event queue.
    fn capture_frame(&mut self) -> CameraResult<CapturedFile>;

    /// Releases the camera. Safe to call repeatedly.
    fn close(&mut self) -> CameraResult<()>;
}

/// Polls until the queue reports a timeout, returning any files the camera
/// announced in the meantime (e.g. the JPEG half of a RAW+JPEG capture).
///
/// Those extra files are only reported; they are neither downloaded nor deleted.
pub fn drain_events<F>(mut poll: F) -> CameraResult<Vec<String>>
where
    F: FnMut() -> CameraResult<CameraEvent>,
{
    let mut auxiliary = Vec::new();
    for _ in 0..MAX_DRAINED_EVENTS {
        match poll()? {
            CameraEvent::Timeout => return Ok(auxiliary),
            CameraEvent::FileAdded { folder, name } => {
                let path = format!("{}/{}", folder.trim_end_matches('/'), name);
                warn!(file = %path, "Unexpected new file");
                auxiliary.push(path);
            }
            CameraEvent::Other(_) => {}
        }
    }
    warn!(
        limit = MAX_DRAINED_EVENTS,
        "Camera event queue did not drain; continuing"
    );
    Ok(auxiliary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::error::CameraError;
    use std::collections::VecDeque;

    #[test]
    fn test_drain_stops_at_timeout() {
        let mut events = VecDeque::from(vec![
            CameraEvent::Other("capture complete".into()),
            CameraEvent::Timeout,
            CameraEvent::FileAdded { folder: "/".into(), name: "never.JPG".into() },
        ]);
        let aux = drain_events(|| Ok(events.pop_front().unwrap_or(CameraEvent::Timeout))).unwrap();
        assert!(aux.is_empty());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_drain_reports_auxiliary_files() {
        let mut events = VecDeque::from(vec![
            CameraEvent::FileAdded { folder: "/store_00010001/".into(), name: "DSC0001.JPG".into() },
            CameraEvent::Timeout,
        ]);
        let aux = drain_events(|| Ok(events.pop_front().unwrap_or(CameraEvent::Timeout))).unwrap();
        assert_eq!(aux, vec!["/store_00010001/DSC0001.JPG".to_string()]);
    }

    #[test]
    fn test_drain_is_bounded() {
        let mut polls = 0;
        let aux = drain_events(|| {
            polls += 1;
            Ok(CameraEvent::Other("busy".into()))
        })
        .unwrap();
        assert!(aux.is_empty());
        assert_eq!(polls, MAX_DRAINED_EVENTS);
    }

    #[test]
    fn test_drain_propagates_poll_error() {
        let result = drain_events(|| Err(CameraError::CaptureTransport("usb".into())));
        assert!(matches!(result, Err(CameraError::CaptureTransport(_))));
    }

    #[test]
    fn test_captured_file_extension() {
        let file = CapturedFile { folder: "/".into(), name: "DSC0001.ARW".into(), data: vec![] };
        assert_eq!(file.extension(), Some("ARW"));
    }
}
