use std::io::Write;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::dng::artifact::CaptureArtifact;
use crate::image_pipeline::dng::types::DngConfig;

pub trait DngWriter {
    fn write_dng(&self, artifact: &CaptureArtifact, output: &mut dyn Write, config: &DngConfig) -> Result<()>;
}
