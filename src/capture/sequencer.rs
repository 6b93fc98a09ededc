use std::fs;
use std::io::Write;
use std::path::Path;
use std::thread;

use tracing::{debug, info, info_span, instrument, warn};

use crate::camera::{CameraConfigRequest, CameraConnector, CameraSession, CapturedFile};
use crate::capture::error::{CaptureError, CaptureFailure, CaptureResult};
use crate::capture::scoped::{ScopedCamera, ScopedLight};
use crate::capture::timing::{CaptureTimings, Timer};
use crate::capture::types::{CaptureConfig, CaptureState, ColorPass, PASS_SATURATION};
use crate::image_pipeline::{
    extract_color, CaptureArtifact, CfaColor, ChannelGrid, DngWriter, MergedRawBuffer, PipelineError,
    RawCapture, RawImageReader, RawLoaderReader, StandardDngWriter,
};
use crate::light::{LightCommand, LightControl, LightScanner, ScanOptions, NEEWER_MANUFACTURER_ID};

/// The channel grids taken from one pass. Only the blue pass keeps its
/// decoded capture, as the merge base and metadata source.
pub(super) struct PassCapture {
    pub(super) capture: Option<RawCapture>,
    pub(super) grids: Vec<(CfaColor, ChannelGrid)>,
}

pub struct CaptureSequencer<R: RawImageReader, W: DngWriter> {
    reader: R,
    writer: W,
    config: CaptureConfig,
    state: CaptureState,
    timings: CaptureTimings,
}

impl CaptureSequencer<RawLoaderReader, StandardDngWriter> {
    pub fn new(config: CaptureConfig) -> Self {
        Self::with_custom(RawLoaderReader, StandardDngWriter, config)
    }
}

impl<R: RawImageReader, W: DngWriter> CaptureSequencer<R, W> {
    pub fn with_custom(reader: R, writer: W, config: CaptureConfig) -> Self {
        Self {
            reader,
            writer,
            config,
            state: CaptureState::Init,
            timings: CaptureTimings::new(),
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Timings of the most recent run.
    pub fn timings(&self) -> &CaptureTimings {
        &self.timings
    }

    fn transition(&mut self, next: CaptureState) {
        info!(from = %self.state, to = %next, "State transition");
        self.state = next;
    }

    fn fail(&mut self, error: impl Into<CaptureError>) -> CaptureFailure {
        let failure = CaptureFailure {
            state: self.state,
            error: error.into(),
        };
        warn!(state = %failure.state, error = %failure.error, "Capture sequence failed");
        self.state = CaptureState::Failed;
        failure
    }

    fn record(&mut self, timer: Timer) {
        let (name, duration) = timer.stop();
        debug!(step = %name, ms = duration.as_secs_f64() * 1000.0, "Step complete");
        self.timings.add_step(name, duration);
    }

    /// Runs the capture passes and merge, returning the artifact without
    /// writing it. Light and camera are released before this returns.
    #[instrument(skip_all)]
    pub fn capture_artifact<S, C>(&mut self, scanner: &mut S, connector: &mut C) -> CaptureResult<CaptureArtifact>
    where
        S: LightScanner,
        C: CameraConnector,
    {
        let artifact = self.assemble(scanner, connector)?;
        self.finish();
        Ok(artifact)
    }

    /// Captures and writes the DNG to `output`.
    #[instrument(skip_all)]
    pub fn run<S, C>(&mut self, scanner: &mut S, connector: &mut C, output: &mut dyn Write) -> CaptureResult<()>
    where
        S: LightScanner,
        C: CameraConnector,
    {
        let artifact = self.assemble(scanner, connector)?;
        self.write_artifact(&artifact, output)?;
        self.finish();
        Ok(())
    }

    /// Captures and writes the DNG to `path`. The DNG is encoded in memory
    /// first; the file is only created once encoding has succeeded, so a
    /// failed run leaves nothing behind.
    #[instrument(skip_all)]
    pub fn run_file<S, C, P>(&mut self, scanner: &mut S, connector: &mut C, path: P) -> CaptureResult<()>
    where
        S: LightScanner,
        C: CameraConnector,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let artifact = self.assemble(scanner, connector)?;

        let mut encoded: Vec<u8> = Vec::new();
        self.write_artifact(&artifact, &mut encoded)?;

        {
            let _span = info_span!("write_output_file", bytes = encoded.len()).entered();
            fs::write(path, &encoded)
                .map_err(|e| self.fail(CaptureError::OutputWriteError(format!("{}: {}", path.display(), e))))?;
        }

        info!(output = %path.display(), "DNG written");
        self.finish();
        Ok(())
    }

    fn finish(&mut self) {
        self.transition(CaptureState::Done);
        self.timings.log_summary();
    }

    fn write_artifact(&mut self, artifact: &CaptureArtifact, output: &mut dyn Write) -> CaptureResult<()> {
        let _span = info_span!("encode_dng").entered();
        let timer = Timer::start("write");
        self.writer
            .write_dng(artifact, output, &self.config.dng)
            .map_err(|e| self.fail(e))?;
        self.record(timer);
        Ok(())
    }

    fn pass_commands(&self) -> Result<[LightCommand; 3], CaptureError> {
        let [red, green, blue] = ColorPass::ALL
            .map(|pass| LightCommand::new(pass.hue(), PASS_SATURATION, self.config.intensity(pass)));
        Ok([red?, green?, blue?])
    }

    /// Everything up to and including the merge; leaves the state at `Merging`.
    fn assemble<S, C>(&mut self, scanner: &mut S, connector: &mut C) -> CaptureResult<CaptureArtifact>
    where
        S: LightScanner,
        C: CameraConnector,
    {
        self.state = CaptureState::Init;
        self.timings = CaptureTimings::new();
        info!(
            shutter_speed = %self.config.shutter_speed,
            intensities = ?self.config.intensities,
            "Starting tri-color capture"
        );

        // Bad intensities are rejected before any device is touched
        let commands = self.pass_commands().map_err(|e| self.fail(e))?;

        self.transition(CaptureState::LightConnecting);
        let options = ScanOptions::new(NEEWER_MANUFACTURER_ID)
            .address(self.config.light_address.clone())
            .scan_window(self.config.scan_window);
        let timer = Timer::start("light_scan");
        let light = scanner.connect(&options).map_err(|e| self.fail(e))?;
        self.record(timer);
        let mut light = ScopedLight::new(light);

        self.transition(CaptureState::CameraConfiguring);
        let timer = Timer::start("camera_configure");
        let session = connector.open().map_err(|e| self.fail(e))?;
        let mut camera = ScopedCamera::new(session);
        let request = CameraConfigRequest::new(self.config.shutter_speed)
            .capture_target(self.config.capture_target);
        let resolved = camera.configure(&request).map_err(|e| self.fail(e))?;
        self.record(timer);
        info!(
            shutter_speed = %resolved.shutter_speed,
            capture_target = %resolved.capture_target,
            "Camera configured"
        );

        let red = self.capture_pass(ColorPass::Red, &commands, &mut *light, &mut *camera)?;
        let green = self.capture_pass(ColorPass::Green, &commands, &mut *light, &mut *camera)?;
        let blue = self.capture_pass(ColorPass::Blue, &commands, &mut *light, &mut *camera)?;

        drop(camera);
        drop(light);

        self.transition(CaptureState::Merging);
        let timer = Timer::start("merge");
        let artifact = {
            let _span = info_span!("merge").entered();
            merge_passes(red, green, blue, &self.config).map_err(|e| self.fail(e))?
        };
        self.record(timer);
        info!(
            width = artifact.width(),
            height = artifact.height(),
            cfa = ?artifact.cfa_pattern,
            "Merged capture"
        );
        Ok(artifact)
    }

    pub(super) fn capture_pass<L, S>(
        &mut self,
        pass: ColorPass,
        commands: &[LightCommand; 3],
        light: &mut L,
        camera: &mut S,
    ) -> CaptureResult<PassCapture>
    where
        L: LightControl,
        S: CameraSession,
    {
        self.transition(pass.state());
        let _span = info_span!("capture_pass", color = %pass).entered();
        let timer = Timer::start(pass.name());

        light.set_color(&commands[pass.index()]).map_err(|e| self.fail(e))?;
        thread::sleep(self.config.settle_delay(pass));

        let file = camera.capture_frame().map_err(|e| self.fail(e))?;
        debug!(file = %file.name, bytes = file.data.len(), "Frame retrieved");
        self.keep_raw(pass, &file).map_err(|e| self.fail(e))?;

        let capture = {
            let _span = info_span!("decode_raw").entered();
            self.reader.read_raw(&file.data).map_err(|e| self.fail(e))?
        };

        let mut grids = Vec::with_capacity(pass.colors().len());
        for &color in pass.colors() {
            let grid = extract_color(&capture, color).map_err(|e| self.fail(e))?;
            match grid.min_max() {
                Some((min, max)) => info!(?color, min, max, "Channel range"),
                None => warn!(?color, "Channel is empty"),
            }
            grids.push((color, grid));
        }

        // Red and green samples live on only in their grids
        let capture = match pass {
            ColorPass::Blue => Some(capture),
            ColorPass::Red | ColorPass::Green => None,
        };

        self.record(timer);
        Ok(PassCapture { capture, grids })
    }

    fn keep_raw(&self, pass: ColorPass, file: &CapturedFile) -> Result<(), CaptureError> {
        let Some(dir) = &self.config.keep_raw_dir else {
            return Ok(());
        };
        let path = dir.join(format!("{}.{}", pass.name(), file.extension().unwrap_or("raw")));
        fs::create_dir_all(dir)
            .and_then(|_| fs::write(&path, &file.data))
            .map_err(|e| CaptureError::OutputWriteError(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Kept raw file");
        Ok(())
    }
}

/// Builds the mosaic on the blue capture, then overwrites blue, both greens
/// and red in that order.
fn merge_passes(
    red: PassCapture,
    green: PassCapture,
    blue: PassCapture,
    config: &CaptureConfig,
) -> crate::image_pipeline::Result<CaptureArtifact> {
    let mut base = blue
        .capture
        .ok_or_else(|| PipelineError::IncompleteMerge(vec![CfaColor::Blue]))?;
    let mut merged = MergedRawBuffer::from_base(std::mem::take(&mut base.data), base.cfa);
    for (color, grid) in blue.grids.iter().chain(&green.grids).chain(&red.grids) {
        merged.write_channel(*color, grid)?;
    }
    CaptureArtifact::assemble(merged, &base, &config.dng)
}
