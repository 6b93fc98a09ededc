//! EXIF fields copied from the last capture into the merged output.

use std::io::Cursor;

use exif::{In, Tag, Value};
use tracing::debug;

use crate::image_pipeline::common::error::{PipelineError, Result};

/// Tags carried over: lens, focal length, aperture, exposure, make/model,
/// orientation, timestamp and ISO.
pub const PRESERVED_TAGS: [Tag; 10] = [
    Tag::LensModel,
    Tag::FocalLengthIn35mmFilm,
    Tag::FocalLength,
    Tag::FNumber,
    Tag::ExposureTime,
    Tag::Make,
    Tag::Model,
    Tag::Orientation,
    Tag::DateTime,
    Tag::PhotographicSensitivity,
];

#[derive(Debug, Clone, PartialEq)]
pub enum ExifValue {
    Ascii(String),
    Short(Vec<u16>),
    Long(Vec<u32>),
    /// Numerator/denominator pairs
    Rational(Vec<(u32, u32)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExifEntry {
    /// TIFF tag number
    pub tag: u16,
    pub value: ExifValue,
}

/// Ordered, de-duplicated set of preserved EXIF entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifSubset {
    entries: Vec<ExifEntry>,
}

impl ExifSubset {
    /// Parses the EXIF block of a TIFF-based raw file and keeps the preserved tags.
    ///
    /// Tags are matched by number regardless of whether they sit in IFD0 or the
    /// Exif sub-IFD; thumbnail IFDs are ignored.
    pub fn from_raw_bytes(data: &[u8]) -> Result<Self> {
        let exif = exif::Reader::new()
            .read_from_container(&mut Cursor::new(data))
            .map_err(|e| PipelineError::MetadataError(e.to_string()))?;

        let mut subset = ExifSubset::default();
        for field in exif.fields().filter(|f| f.ifd_num == In::PRIMARY) {
            let number = field.tag.number();
            if !PRESERVED_TAGS.iter().any(|t| t.number() == number) {
                continue;
            }
            match convert_value(&field.value) {
                Some(value) => subset.insert(number, value),
                None => debug!(tag = number, "Skipping EXIF field with unsupported type"),
            }
        }
        debug!(count = subset.len(), "Collected preserved EXIF fields");
        Ok(subset)
    }

    /// Adds an entry unless the tag is already present.
    pub fn insert(&mut self, tag: u16, value: ExifValue) {
        if self.get(tag).is_none() {
            self.entries.push(ExifEntry { tag, value });
        }
    }

    pub fn get(&self, tag: u16) -> Option<&ExifValue> {
        self.entries.iter().find(|e| e.tag == tag).map(|e| &e.value)
    }

    pub fn ascii(&self, tag: u16) -> Option<&str> {
        match self.get(tag)? {
            ExifValue::Ascii(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn make(&self) -> Option<&str> {
        self.ascii(Tag::Make.number())
    }

    pub fn model(&self) -> Option<&str> {
        self.ascii(Tag::Model.number())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExifEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn convert_value(value: &Value) -> Option<ExifValue> {
    match value {
        Value::Ascii(parts) => {
            let first = parts.first()?;
            let text = String::from_utf8_lossy(first)
                .trim_end_matches('\0')
                .trim()
                .to_string();
            Some(ExifValue::Ascii(text))
        }
        Value::Short(values) => Some(ExifValue::Short(values.clone())),
        Value::Long(values) => Some(ExifValue::Long(values.clone())),
        Value::Rational(values) => Some(ExifValue::Rational(
            values.iter().map(|r| (r.num, r.denom)).collect(),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_value() {
        let mut subset = ExifSubset::default();
        subset.insert(Tag::Make.number(), ExifValue::Ascii("SONY".into()));
        subset.insert(Tag::Make.number(), ExifValue::Ascii("OTHER".into()));

        assert_eq!(subset.len(), 1);
        assert_eq!(subset.make(), Some("SONY"));
        assert_eq!(subset.model(), None);
    }

    #[test]
    fn test_convert_ascii_strips_nul() {
        let value = Value::Ascii(vec![b"ILCE-7M3\0".to_vec()]);
        assert_eq!(convert_value(&value), Some(ExifValue::Ascii("ILCE-7M3".into())));
    }

    #[test]
    fn test_convert_rational() {
        let value = Value::Rational(vec![exif::Rational { num: 1, denom: 250 }]);
        assert_eq!(convert_value(&value), Some(ExifValue::Rational(vec![(1, 250)])));
    }

    #[test]
    fn test_rejects_non_tiff_data() {
        assert!(matches!(
            ExifSubset::from_raw_bytes(b"definitely not a raw file"),
            Err(PipelineError::MetadataError(_))
        ));
    }

    #[test]
    fn test_preserved_tag_numbers() {
        let numbers: Vec<u16> = PRESERVED_TAGS.iter().map(|t| t.number()).collect();
        for expected in [0x010F, 0x0110, 0x0112, 0x0132, 0x829A, 0x829D, 0x8827, 0x920A, 0xA405, 0xA434] {
            assert!(numbers.contains(&expected), "missing tag {expected:#06x}");
        }
    }
}
