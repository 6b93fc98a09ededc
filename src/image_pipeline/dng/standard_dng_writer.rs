use std::io::{Cursor, Seek, Write};
use tiff::encoder::{colortype, DirectoryEncoder, Rational, SRational, TiffEncoder, TiffKind};
use tiff::tags::Tag;
use tiff::TiffResult;
use tracing::debug;
use crate::image_pipeline::common::error::{Result, PipelineError};
use crate::image_pipeline::dng::artifact::CaptureArtifact;
use crate::image_pipeline::dng::tags;
use crate::image_pipeline::dng::types::DngConfig;
use crate::image_pipeline::dng::writer::DngWriter;
use crate::image_pipeline::raw::{ExifSubset, ExifValue, CFA_PERIOD};

/// Writes uncompressed single-page CFA DNGs with the tiff crate.
pub struct StandardDngWriter;

fn encode_error(e: tiff::TiffError) -> PipelineError {
    PipelineError::EncodeError(e.to_string())
}

impl DngWriter for StandardDngWriter {
    fn write_dng(&self, artifact: &CaptureArtifact, output: &mut dyn Write, config: &DngConfig) -> Result<()> {
        let (width, height) = (artifact.width(), artifact.height());
        if config.validate_dimensions && (width == 0 || height == 0) {
            return Err(PipelineError::InvalidDimensions(width, height));
        }
        debug!("Encoding DNG image: {}x{}", width, height);

        let samples: Vec<u16> = artifact.mosaic.iter().copied().collect();
        let mut buffer = Vec::new();
        {
            let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer)).map_err(encode_error)?;
            let mut image = encoder
                .new_image::<colortype::Gray16>(width as u32, height as u32)
                .map_err(encode_error)?;

            write_dng_tags(image.encoder(), artifact, config).map_err(encode_error)?;
            write_exif_tags(image.encoder(), &artifact.exif).map_err(encode_error)?;

            image.write_data(&samples).map_err(encode_error)?;
        }

        output.write_all(&buffer)?;

        debug!("DNG encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}

fn write_dng_tags<W: Write + Seek, K: TiffKind>(
    dir: &mut DirectoryEncoder<'_, W, K>,
    artifact: &CaptureArtifact,
    config: &DngConfig,
) -> TiffResult<()> {
    let repeat_dim = [CFA_PERIOD as u16, CFA_PERIOD as u16];
    let cfa_pattern: Vec<u8> = artifact.cfa_pattern.iter().flatten().copied().collect();
    let black_levels: Vec<u16> = artifact.black_levels.iter().flatten().copied().collect();
    let color_matrix: Vec<SRational> = artifact
        .color_matrix_rationals()
        .into_iter()
        .map(|(n, d)| SRational { n, d })
        .collect();
    // No per-channel normalization is applied, so neutral stays at unity
    let as_shot_neutral = [
        Rational { n: 1, d: 1 },
        Rational { n: 1, d: 1 },
        Rational { n: 1, d: 1 },
    ];

    dir.write_tag(Tag::Unknown(tags::NEW_SUBFILE_TYPE), 0u32)?;
    dir.write_tag(Tag::PhotometricInterpretation, tags::PHOTOMETRIC_CFA)?;
    dir.write_tag(Tag::Unknown(tags::CFA_REPEAT_PATTERN_DIM), &repeat_dim[..])?;
    dir.write_tag(Tag::Unknown(tags::CFA_PATTERN), &cfa_pattern[..])?;
    dir.write_tag(Tag::Unknown(tags::COLOR_MATRIX_1), &color_matrix[..])?;
    dir.write_tag(Tag::Unknown(tags::CALIBRATION_ILLUMINANT_1), config.calibration_illuminant)?;
    dir.write_tag(Tag::Unknown(tags::BLACK_LEVEL_REPEAT_DIM), &repeat_dim[..])?;
    dir.write_tag(Tag::Unknown(tags::BLACK_LEVEL), &black_levels[..])?;
    dir.write_tag(Tag::Unknown(tags::WHITE_LEVEL), artifact.white_level)?;
    dir.write_tag(Tag::Unknown(tags::DNG_VERSION), &config.dng_version[..])?;
    dir.write_tag(Tag::Unknown(tags::DNG_BACKWARD_VERSION), &config.dng_version[..])?;
    dir.write_tag(Tag::Unknown(tags::AS_SHOT_NEUTRAL), &as_shot_neutral[..])?;
    dir.write_tag(Tag::Unknown(tags::UNIQUE_CAMERA_MODEL), artifact.unique_camera_model.as_str())?;
    Ok(())
}

/// Copies the preserved EXIF fields into IFD0, as TIFF/EP allows.
///
/// No Exif sub-IFD is written, so exposure fields such as ExposureTime,
/// FNumber, ISO and LensModel sit next to the DNG tags. LibRaw and rawloader
/// read them from there; exiftool and exiv2 list them as IFD0 (`Image.*`)
/// tags rather than under `Exif.Photo`.
fn write_exif_tags<W: Write + Seek, K: TiffKind>(
    dir: &mut DirectoryEncoder<'_, W, K>,
    exif: &ExifSubset,
) -> TiffResult<()> {
    for entry in exif.iter() {
        let tag = Tag::Unknown(entry.tag);
        match &entry.value {
            ExifValue::Ascii(text) => dir.write_tag(tag, text.as_str())?,
            ExifValue::Short(values) => dir.write_tag(tag, &values[..])?,
            ExifValue::Long(values) => dir.write_tag(tag, &values[..])?,
            ExifValue::Rational(values) => {
                let rationals: Vec<Rational> =
                    values.iter().map(|&(n, d)| Rational { n, d }).collect();
                dir.write_tag(tag, &rationals[..])?
            }
        }
    }
    Ok(())
}
