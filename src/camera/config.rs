//! Camera configuration requests.
//!
//! A request is an immutable value; resolving it against the choices the camera
//! enumerates yields the exact labels to write back, so nothing mutates a shared
//! configuration tree while settings are being composed.

use tracing::debug;

use crate::camera::error::{CameraError, CameraResult};
use crate::camera::shutter::{select_shutter_speed, ShutterSpeed};

/// Where the camera stores a capture before it is downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTarget {
    /// In-camera RAM; nothing lands on the memory card
    VolatileMemory,
    /// Removable storage
    MemoryCard,
}

impl CaptureTarget {
    /// Choice labels drivers use for this target, in order of preference.
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            CaptureTarget::VolatileMemory => &["Internal RAM", "sdram"],
            CaptureTarget::MemoryCard => &["Memory card", "card"],
        }
    }

    fn resolve<S: AsRef<str>>(&self, choices: &[S]) -> CameraResult<String> {
        self.labels()
            .iter()
            .find_map(|label| {
                choices
                    .iter()
                    .map(|c| c.as_ref())
                    .find(|choice| choice.eq_ignore_ascii_case(label))
            })
            .map(str::to_string)
            .ok_or_else(|| CameraError::UnsupportedCaptureTarget(format!("{self:?}")))
    }
}

/// Settings to apply before the first capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConfigRequest {
    pub capture_target: CaptureTarget,
    pub shutter_speed: ShutterSpeed,
}

impl CameraConfigRequest {
    pub fn new(shutter_speed: ShutterSpeed) -> Self {
        Self {
            capture_target: CaptureTarget::VolatileMemory,
            shutter_speed,
        }
    }

    pub fn capture_target(mut self, capture_target: CaptureTarget) -> Self {
        self.capture_target = capture_target;
        self
    }

    /// Resolves the request against the camera's enumerated choices.
    pub fn resolve<S: AsRef<str>>(
        &self,
        target_choices: &[S],
        shutter_choices: &[S],
    ) -> CameraResult<ResolvedCameraConfig> {
        let capture_target = self.capture_target.resolve(target_choices)?;
        let shutter_speed = select_shutter_speed(shutter_choices, &self.shutter_speed)?;
        debug!(%capture_target, %shutter_speed, "Resolved camera configuration");
        Ok(ResolvedCameraConfig {
            capture_target,
            shutter_speed,
            exposure: self.shutter_speed,
        })
    }
}

/// Concrete choice labels selected for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCameraConfig {
    /// Capture target label as enumerated by the camera
    pub capture_target: String,
    /// Shutter speed label as enumerated by the camera
    pub shutter_speed: String,
    /// Exposure time the label stands for
    pub exposure: ShutterSpeed,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(speed: &str) -> CameraConfigRequest {
        CameraConfigRequest::new(ShutterSpeed::parse(speed).unwrap())
    }

    #[test]
    fn test_resolve_volatile_target_and_speed() {
        let targets = ["Memory card", "Internal RAM"];
        let speeds = ["1/60", "1/125", "Bulb"];
        let resolved = request("1/125").resolve(&targets, &speeds).unwrap();

        assert_eq!(resolved.capture_target, "Internal RAM");
        assert_eq!(resolved.shutter_speed, "1/125");
        assert_eq!(resolved.exposure.to_string(), "1/125");
    }

    #[test]
    fn test_resolve_accepts_alternate_label() {
        let targets = vec!["card".to_string(), "sdram".to_string()];
        let speeds = vec!["1/125".to_string()];
        let resolved = request("1/125").resolve(&targets, &speeds).unwrap();
        assert_eq!(resolved.capture_target, "sdram");
    }

    #[test]
    fn test_resolve_missing_target() {
        let targets = ["Memory card"];
        let speeds = ["1/125"];
        let err = request("1/125").resolve(&targets, &speeds).unwrap_err();
        assert!(matches!(err, CameraError::UnsupportedCaptureTarget(_)));
    }

    #[test]
    fn test_resolve_unsupported_speed() {
        let targets = ["Internal RAM"];
        let speeds = ["1/125", "Bulb"];
        let err = request("1/100").resolve(&targets, &speeds).unwrap_err();
        assert!(matches!(err, CameraError::UnsupportedShutterSpeed { .. }));
    }

    #[test]
    fn test_request_is_not_mutated_by_resolve() {
        let req = request("1/125").capture_target(CaptureTarget::MemoryCard);
        let before = req;
        let _ = req.resolve(&["Memory card"], &["1/125"]);
        assert_eq!(req, before);
    }
}
