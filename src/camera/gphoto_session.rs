//! libgphoto2-backed camera session.

use std::time::Duration;

use gphoto2::camera::CameraEvent as GphotoEvent;
use gphoto2::widget::RadioWidget;
use gphoto2::{Camera, Context};
use tracing::{debug, info, instrument};

use crate::camera::config::{CameraConfigRequest, ResolvedCameraConfig};
use crate::camera::error::{CameraError, CameraResult};
use crate::camera::session::{drain_events, CameraConnector, CameraEvent, CameraSession, CapturedFile};

const CAPTURE_TARGET_KEY: &str = "capturetarget";
const SHUTTER_SPEED_KEY: &str = "shutterspeed";

fn transport(e: gphoto2::Error) -> CameraError {
    CameraError::CaptureTransport(e.to_string())
}

fn configuration(e: gphoto2::Error) -> CameraError {
    CameraError::Configuration(e.to_string())
}

/// Opens the first camera libgphoto2 autodetects.
pub struct GphotoConnector {
    event_timeout: Duration,
}

impl GphotoConnector {
    pub fn new(event_timeout: Duration) -> Self {
        Self { event_timeout }
    }
}

impl CameraConnector for GphotoConnector {
    type Session = GphotoSession;

    fn open(&mut self) -> CameraResult<GphotoSession> {
        info!("Initializing camera");
        let context = Context::new().map_err(|e| CameraError::Open(e.to_string()))?;
        let camera = context
            .autodetect_camera()
            .wait()
            .map_err(|e| CameraError::Open(e.to_string()))?;
        debug!("Camera connected");
        Ok(GphotoSession {
            context,
            camera: Some(camera),
            event_timeout: self.event_timeout,
            configured: false,
        })
    }
}

/// An open libgphoto2 camera. Released on drop.
pub struct GphotoSession {
    context: Context,
    camera: Option<Camera>,
    event_timeout: Duration,
    configured: bool,
}

impl GphotoSession {
    fn camera(&self) -> CameraResult<&Camera> {
        self.camera.as_ref().ok_or(CameraError::Closed)
    }

    fn radio(&self, key: &str) -> CameraResult<RadioWidget> {
        self.camera()?
            .config_key::<RadioWidget>(key)
            .wait()
            .map_err(|_| CameraError::MissingSetting(key.to_string()))
    }

    fn poll_event(&self) -> CameraResult<CameraEvent> {
        let event = self
            .camera()?
            .wait_event(self.event_timeout)
            .wait()
            .map_err(transport)?;
        Ok(match event {
            GphotoEvent::Timeout => CameraEvent::Timeout,
            GphotoEvent::NewFile(path) => CameraEvent::FileAdded {
                folder: path.folder().to_string(),
                name: path.name().to_string(),
            },
            other => CameraEvent::Other(format!("{other:?}")),
        })
    }
}

impl CameraSession for GphotoSession {
    #[instrument(skip(self, request), fields(shutter_speed = %request.shutter_speed))]
    fn configure(&mut self, request: &CameraConfigRequest) -> CameraResult<ResolvedCameraConfig> {
        info!("Configuring camera");
        let target = self.radio(CAPTURE_TARGET_KEY)?;
        let shutter = self.radio(SHUTTER_SPEED_KEY)?;

        let target_choices: Vec<String> = target.choices_iter().collect();
        let shutter_choices: Vec<String> = shutter.choices_iter().collect();
        let resolved = request.resolve(&target_choices, &shutter_choices)?;

        let camera = self.camera()?;
        target
            .set_choice(&resolved.capture_target)
            .map_err(configuration)?;
        camera.set_config(&target).wait().map_err(configuration)?;

        info!(shutter_speed = %resolved.shutter_speed, "Setting shutter speed");
        shutter
            .set_choice(&resolved.shutter_speed)
            .map_err(configuration)?;
        camera.set_config(&shutter).wait().map_err(configuration)?;

        self.configured = true;
        Ok(resolved)
    }

    fn capture_frame(&mut self) -> CameraResult<CapturedFile> {
        if !self.configured {
            return Err(CameraError::NotConfigured);
        }
        let camera = self.camera()?;

        let path = camera.capture_image().wait().map_err(transport)?;
        let folder = path.folder().to_string();
        let name = path.name().to_string();
        info!(folder = %folder, name = %name, "Captured");

        let fs = camera.fs();
        let file = fs.download(&folder, &name).wait().map_err(transport)?;
        let data = file.get_data(&self.context).wait().map_err(transport)?.into_vec();
        debug!(bytes = data.len(), "Downloaded capture");

        fs.delete_file(&folder, &name).wait().map_err(transport)?;

        let auxiliary = drain_events(|| self.poll_event())?;
        if !auxiliary.is_empty() {
            debug!(count = auxiliary.len(), "Auxiliary files left on camera");
        }

        Ok(CapturedFile { folder, name, data })
    }

    fn close(&mut self) -> CameraResult<()> {
        if self.camera.take().is_some() {
            info!("Closing camera");
        }
        Ok(())
    }
}
