//! Capture sequence configuration and state types

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::camera::{CaptureTarget, ShutterSpeed, DEFAULT_EVENT_TIMEOUT};
use crate::image_pipeline::{CfaColor, DngConfig};
use crate::light::DEFAULT_SCAN_WINDOW;

/// Saturation used for every color pass.
pub const PASS_SATURATION: u8 = 100;

/// Settle time after each color change, red/green/blue. The blue pass waits
/// longer since its file also supplies the metadata for the output.
pub const DEFAULT_SETTLE_DELAYS: [Duration; 3] = [
    Duration::from_millis(100),
    Duration::from_millis(100),
    Duration::from_millis(200),
];

/// Where the capture state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Init,
    LightConnecting,
    CameraConfiguring,
    CapturingRed,
    CapturingGreen,
    CapturingBlue,
    Merging,
    Done,
    Failed,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CaptureState::Init => "initializing",
            CaptureState::LightConnecting => "connecting to the light",
            CaptureState::CameraConfiguring => "configuring the camera",
            CaptureState::CapturingRed => "capturing red",
            CaptureState::CapturingGreen => "capturing green",
            CaptureState::CapturingBlue => "capturing blue",
            CaptureState::Merging => "merging",
            CaptureState::Done => "done",
            CaptureState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One exposure under a single light color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorPass {
    Red,
    Green,
    Blue,
}

impl ColorPass {
    /// Capture order. Blue goes last so its file carries the metadata.
    pub const ALL: [ColorPass; 3] = [ColorPass::Red, ColorPass::Green, ColorPass::Blue];

    pub fn hue(self) -> u16 {
        match self {
            ColorPass::Red => 0,
            ColorPass::Green => 120,
            ColorPass::Blue => 240,
        }
    }

    /// CFA sites filled from this pass. Both green sites come from the one green exposure.
    pub fn colors(self) -> &'static [CfaColor] {
        match self {
            ColorPass::Red => &[CfaColor::Red],
            ColorPass::Green => &[CfaColor::Green, CfaColor::GreenAlt],
            ColorPass::Blue => &[CfaColor::Blue],
        }
    }

    pub fn state(self) -> CaptureState {
        match self {
            ColorPass::Red => CaptureState::CapturingRed,
            ColorPass::Green => CaptureState::CapturingGreen,
            ColorPass::Blue => CaptureState::CapturingBlue,
        }
    }

    pub fn index(self) -> usize {
        match self {
            ColorPass::Red => 0,
            ColorPass::Green => 1,
            ColorPass::Blue => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorPass::Red => "red",
            ColorPass::Green => "green",
            ColorPass::Blue => "blue",
        }
    }
}

impl fmt::Display for ColorPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for one capture session
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Exposure time; must match one of the camera's choices exactly
    pub shutter_speed: ShutterSpeed,
    /// Light brightness in percent for the red, green and blue passes
    pub intensities: [u8; 3],
    /// Connect to this light address instead of matching by manufacturer
    pub light_address: Option<String>,
    /// How long to scan for the light
    pub scan_window: Duration,
    /// Timeout of one camera event poll while draining
    pub event_timeout: Duration,
    /// Settle time after each color change, indexed like `ColorPass::index`
    pub settle_delays: [Duration; 3],
    pub capture_target: CaptureTarget,
    /// Keep each pass's raw file as `<dir>/<color>.<ext>`
    pub keep_raw_dir: Option<PathBuf>,
    pub dng: DngConfig,
}

impl CaptureConfig {
    pub fn builder(shutter_speed: ShutterSpeed) -> CaptureConfigBuilder {
        CaptureConfigBuilder::new(shutter_speed)
    }

    pub fn intensity(&self, pass: ColorPass) -> u8 {
        self.intensities[pass.index()]
    }

    pub fn settle_delay(&self, pass: ColorPass) -> Duration {
        self.settle_delays[pass.index()]
    }
}

/// Builder for CaptureConfig
pub struct CaptureConfigBuilder {
    shutter_speed: ShutterSpeed,
    intensities: Option<[u8; 3]>,
    light_address: Option<String>,
    scan_window: Option<Duration>,
    event_timeout: Option<Duration>,
    settle_delays: Option<[Duration; 3]>,
    capture_target: Option<CaptureTarget>,
    keep_raw_dir: Option<PathBuf>,
    subtract_black_level: Option<bool>,
    dng: Option<DngConfig>,
}

impl CaptureConfigBuilder {
    fn new(shutter_speed: ShutterSpeed) -> Self {
        Self {
            shutter_speed,
            intensities: None,
            light_address: None,
            scan_window: None,
            event_timeout: None,
            settle_delays: None,
            capture_target: None,
            keep_raw_dir: None,
            subtract_black_level: None,
            dng: None,
        }
    }

    pub fn intensities(mut self, red: u8, green: u8, blue: u8) -> Self {
        self.intensities = Some([red, green, blue]);
        self
    }

    pub fn light_address(mut self, address: Option<String>) -> Self {
        self.light_address = address;
        self
    }

    pub fn scan_window(mut self, window: Duration) -> Self {
        self.scan_window = Some(window);
        self
    }

    pub fn event_timeout(mut self, timeout: Duration) -> Self {
        self.event_timeout = Some(timeout);
        self
    }

    pub fn settle_delays(mut self, delays: [Duration; 3]) -> Self {
        self.settle_delays = Some(delays);
        self
    }

    pub fn capture_target(mut self, target: CaptureTarget) -> Self {
        self.capture_target = Some(target);
        self
    }

    pub fn keep_raw_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.keep_raw_dir = dir;
        self
    }

    /// Overrides `DngConfig::subtract_black_level` of whichever DNG config is used.
    pub fn subtract_black_level(mut self, subtract: bool) -> Self {
        self.subtract_black_level = Some(subtract);
        self
    }

    pub fn dng(mut self, dng: DngConfig) -> Self {
        self.dng = Some(dng);
        self
    }

    pub fn build(self) -> CaptureConfig {
        let mut dng = self.dng.unwrap_or_default();
        if let Some(subtract) = self.subtract_black_level {
            dng.subtract_black_level = subtract;
        }
        CaptureConfig {
            shutter_speed: self.shutter_speed,
            intensities: self.intensities.unwrap_or([100, 100, 100]),
            light_address: self.light_address,
            scan_window: self.scan_window.unwrap_or(DEFAULT_SCAN_WINDOW),
            event_timeout: self.event_timeout.unwrap_or(DEFAULT_EVENT_TIMEOUT),
            settle_delays: self.settle_delays.unwrap_or(DEFAULT_SETTLE_DELAYS),
            capture_target: self.capture_target.unwrap_or(CaptureTarget::VolatileMemory),
            keep_raw_dir: self.keep_raw_dir,
            dng,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shutter() -> ShutterSpeed {
        ShutterSpeed::parse("1/250").unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = CaptureConfig::builder(shutter()).build();

        assert_eq!(config.intensities, [100, 100, 100]);
        assert_eq!(config.scan_window, Duration::from_secs(5));
        assert_eq!(config.event_timeout, Duration::from_millis(10));
        assert_eq!(config.settle_delay(ColorPass::Red), Duration::from_millis(100));
        assert_eq!(config.settle_delay(ColorPass::Blue), Duration::from_millis(200));
        assert_eq!(config.capture_target, CaptureTarget::VolatileMemory);
        assert!(config.keep_raw_dir.is_none());
        assert!(!config.dng.subtract_black_level);
    }

    #[test]
    fn test_config_builder() {
        let config = CaptureConfig::builder(shutter())
            .intensities(80, 60, 40)
            .light_address(Some("AA:BB:CC:DD:EE:FF".into()))
            .keep_raw_dir(Some(PathBuf::from("/tmp/raw")))
            .dng(DngConfig::builder().remap_green_alt(false).build())
            .subtract_black_level(true)
            .build();

        assert_eq!(config.intensity(ColorPass::Green), 60);
        assert_eq!(config.light_address.as_deref(), Some("AA:BB:CC:DD:EE:FF"));
        assert_eq!(config.keep_raw_dir, Some(PathBuf::from("/tmp/raw")));
        assert!(!config.dng.remap_green_alt);
        assert!(config.dng.subtract_black_level);
    }

    #[test]
    fn test_passes_cover_every_cfa_color_once() {
        let mut colors: Vec<CfaColor> = ColorPass::ALL
            .iter()
            .flat_map(|pass| pass.colors().iter().copied())
            .collect();
        colors.sort_by_key(|c| c.code());
        assert_eq!(colors, CfaColor::ALL.to_vec());
        assert_eq!(
            ColorPass::ALL.map(ColorPass::hue),
            [0, 120, 240]
        );
    }
}
