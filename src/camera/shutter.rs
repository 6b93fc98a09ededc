//! Exact shutter-speed values and matching against camera choices.

use std::fmt;

use num_rational::Ratio;
use tracing::debug;

use crate::camera::error::{CameraError, CameraResult};

/// Label of the long-exposure choice, which has no fixed duration.
pub const BULB: &str = "Bulb";

/// Keeps products of two parsed components within u64.
const MAX_DIGITS: usize = 9;

/// An exposure time in seconds, kept as a reduced fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShutterSpeed(Ratio<u64>);

impl ShutterSpeed {
    /// Parses `"1/250"`, `"30"` or `"2.5"` (and `"1/2.5"`) without going through
    /// floating point.
    pub fn parse(value: &str) -> CameraResult<Self> {
        let value = value.trim();
        let invalid = || CameraError::InvalidShutterSpeed(value.to_string());

        let ratio = match value.split_once('/') {
            Some((num, den)) => {
                let num = parse_decimal(num.trim()).ok_or_else(invalid)?;
                let den = parse_decimal(den.trim()).ok_or_else(invalid)?;
                if *den.numer() == 0 {
                    return Err(invalid());
                }
                num / den
            }
            None => parse_decimal(value).ok_or_else(invalid)?,
        };
        Ok(Self(ratio))
    }

    pub fn numer(&self) -> u64 {
        *self.0.numer()
    }

    pub fn denom(&self) -> u64 {
        *self.0.denom()
    }
}

impl fmt::Display for ShutterSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom() == 1 {
            write!(f, "{}", self.numer())
        } else {
            write!(f, "{}/{}", self.numer(), self.denom())
        }
    }
}

/// Parses an unsigned decimal literal such as `"250"` or `"2.5"` exactly.
fn parse_decimal(text: &str) -> Option<Ratio<u64>> {
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let digits = format!("{int_part}{frac_part}");
    if digits.len() > MAX_DIGITS {
        return None;
    }
    let numer: u64 = digits.parse().ok()?;
    let denom = 10u64.checked_pow(u32::try_from(frac_part.len()).ok()?)?;
    Some(Ratio::new(numer, denom))
}

/// Picks the camera choice whose value equals `requested` exactly.
///
/// `Bulb` and choices that do not parse as a duration are skipped. There is no
/// nearest-speed fallback: all three exposures must meter identically.
pub fn select_shutter_speed<S: AsRef<str>>(
    choices: &[S],
    requested: &ShutterSpeed,
) -> CameraResult<String> {
    for choice in choices.iter().map(|c| c.as_ref()) {
        if choice == BULB {
            continue;
        }
        match ShutterSpeed::parse(choice) {
            Ok(speed) if speed == *requested => return Ok(choice.to_string()),
            Ok(_) => {}
            Err(_) => debug!(choice, "Skipping non-numeric shutter speed choice"),
        }
    }

    Err(CameraError::UnsupportedShutterSpeed {
        requested: requested.to_string(),
        choices: choices
            .iter()
            .map(|c| c.as_ref())
            .filter(|c| *c != BULB)
            .collect::<Vec<_>>()
            .join(", "),
    })
}
