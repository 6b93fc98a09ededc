//! Tri-color capture sequencing
//!
//! Drives one capture session: find the light, configure the camera, expose
//! once under each of red, green and blue light, then merge the three raw
//! files into a single mosaic and hand it to the DNG writer.

mod error;
mod scoped;
mod sequencer;
mod timing;
pub mod types;


pub use error::{CaptureError, CaptureFailure, CaptureResult};
pub use scoped::{ScopedCamera, ScopedLight};
pub use sequencer::CaptureSequencer;
pub use timing::{CaptureTimings, StepTiming, Timer};
pub use types::{
    CaptureConfig,
    CaptureConfigBuilder,
    CaptureState,
    ColorPass,
    DEFAULT_SETTLE_DELAYS,
    PASS_SATURATION,
};
