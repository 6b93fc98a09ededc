//! Tri-color film scanning toolkit.
//!
//! Drives a tethered camera and a BLE RGB light through three exposures
//! (red, green, blue), pulls the matching CFA channel out of each raw capture
//! and merges them into a single synthetic Bayer-mosaic DNG.

pub mod camera;
pub mod capture;
pub mod image_pipeline;
pub mod light;
pub mod logger;
