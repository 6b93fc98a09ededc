//! Raw mosaic merge module
//!
//! Composites per-color channel grids from separate exposures back into a
//! single Bayer mosaic.

mod merged_buffer;

pub use merged_buffer::MergedRawBuffer;
