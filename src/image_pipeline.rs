//! Raw processing for tri-color captures
//!
//! Each capture is decoded into a CFA grid, the sites lit by the matching
//! light color are extracted, and the extracted channels are merged back into
//! one mosaic which is written out as a DNG.

pub mod raw;
pub mod channel;
pub mod merge;
pub mod dng;
pub mod common;

pub use common::{
    PipelineError,
    Result,
};

pub use raw::{
    CfaColor,
    CfaPattern,
    RawCapture,
    RawImageReader,
    RawLoaderReader,
};

pub use channel::{
    extract,
    extract_color,
    locate_color,
    ChannelGrid,
};

pub use merge::MergedRawBuffer;

pub use dng::{
    CaptureArtifact,
    DngConfig,
    DngConfigBuilder,
    DngWriter,
    StandardDngWriter,
};
