//! RGB light control
//!
//! This module drives a single BLE-addressable RGB light: a bounded-time scan
//! to find it, and write-only hue/saturation/brightness commands.

mod command;
mod controller;
mod error;
#[cfg(feature = "bluetooth")]
mod neewer;

pub use command::{LightCommand, COMMAND_PREFIX, MAX_HUE, MAX_PERCENT};
pub use controller::{
    advertisement_matches, LightControl, LightScanner, ScanOptions, DEFAULT_SCAN_WINDOW,
};
pub use error::{LightError, LightResult};

#[cfg(feature = "bluetooth")]
pub use neewer::{NeewerLight, NeewerScanner, NEEWER_MANUFACTURER_ID};

/// Manufacturer identifier carried in the light's advertisement data.
#[cfg(not(feature = "bluetooth"))]
pub const NEEWER_MANUFACTURER_ID: u16 = 52977;

// Fallback types when built without BLE support
#[cfg(not(feature = "bluetooth"))]
pub struct NeewerScanner;

#[cfg(not(feature = "bluetooth"))]
impl NeewerScanner {
    pub fn new() -> LightResult<Self> {
        Ok(Self)
    }
}

/// Light handle that can never be constructed.
#[cfg(not(feature = "bluetooth"))]
pub enum NeewerLight {}

#[cfg(not(feature = "bluetooth"))]
impl LightScanner for NeewerScanner {
    type Light = NeewerLight;

    fn connect(&mut self, _options: &ScanOptions) -> LightResult<NeewerLight> {
        Err(LightError::Unsupported("bluetooth"))
    }
}

#[cfg(not(feature = "bluetooth"))]
impl LightControl for NeewerLight {
    fn set_color(&mut self, _command: &LightCommand) -> LightResult<()> {
        match *self {}
    }

    fn disconnect(&mut self) -> LightResult<()> {
        match *self {}
    }
}
