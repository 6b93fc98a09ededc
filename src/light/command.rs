//! Binary encoding of the HSI "set light" command.

use crate::light::error::{LightError, LightResult};

/// Fixed command header written before every HSI payload.
pub const COMMAND_PREFIX: [u8; 3] = [0x78, 0x86, 0x04];

pub const MAX_HUE: u16 = 359;
pub const MAX_PERCENT: u8 = 100;

/// Encoded command length: prefix + u16 hue + saturation + brightness + checksum.
const ENCODED_LEN: usize = 8;

/// A hue/saturation/brightness request for the light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightCommand {
    /// Hue in degrees, 0-359
    pub hue: u16,
    /// Saturation in percent, 0-100
    pub saturation: u8,
    /// Brightness in percent, 0-100
    pub brightness: u8,
}

impl LightCommand {
    pub fn new(hue: u16, saturation: u8, brightness: u8) -> LightResult<Self> {
        if hue > MAX_HUE {
            return Err(LightError::InvalidCommand(format!(
                "hue {hue} out of range 0-{MAX_HUE}"
            )));
        }
        if saturation > MAX_PERCENT {
            return Err(LightError::InvalidCommand(format!(
                "saturation {saturation} out of range 0-{MAX_PERCENT}"
            )));
        }
        if brightness > MAX_PERCENT {
            return Err(LightError::InvalidCommand(format!(
                "brightness {brightness} out of range 0-{MAX_PERCENT}"
            )));
        }
        Ok(Self { hue, saturation, brightness })
    }

    /// Encodes the command as written to the light's characteristic.
    ///
    /// Layout: `78 86 04`, little-endian u16 hue, u8 saturation, u8 brightness,
    /// then one checksum byte holding the sum of all preceding bytes mod 256.
    pub fn encode(&self) -> [u8; ENCODED_LEN] {
        let mut buf = [0u8; ENCODED_LEN];
        buf[..3].copy_from_slice(&COMMAND_PREFIX);
        buf[3..5].copy_from_slice(&self.hue.to_le_bytes());
        buf[5] = self.saturation;
        buf[6] = self.brightness;
        buf[7] = buf[..7].iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_red_half_brightness() {
        let cmd = LightCommand::new(0, 100, 50).unwrap();
        let encoded = cmd.encode();

        assert_eq!(&encoded[..7], &[0x78, 0x86, 0x04, 0x00, 0x00, 0x64, 0x32]);
        let expected_checksum = (0x78u32 + 0x86 + 0x04 + 0x64 + 0x32) % 256;
        assert_eq!(encoded[7] as u32, expected_checksum);
        assert_eq!(encoded[7], 0x98);
    }

    #[test]
    fn test_encode_hue_is_little_endian() {
        let encoded = LightCommand::new(240, 100, 10).unwrap().encode();
        assert_eq!(encoded[3], 0xF0);
        assert_eq!(encoded[4], 0x00);

        let encoded = LightCommand::new(300, 0, 0).unwrap().encode();
        assert_eq!(encoded[3], 0x2C);
        assert_eq!(encoded[4], 0x01);
    }

    #[test]
    fn test_checksum_wraps() {
        let encoded = LightCommand::new(359, 100, 100).unwrap().encode();
        let sum: u32 = encoded[..7].iter().map(|&b| b as u32).sum();
        assert_eq!(encoded[7] as u32, sum % 256);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        assert!(matches!(
            LightCommand::new(360, 100, 50),
            Err(LightError::InvalidCommand(_))
        ));
        assert!(matches!(
            LightCommand::new(0, 101, 50),
            Err(LightError::InvalidCommand(_))
        ));
        assert!(matches!(
            LightCommand::new(0, 100, 101),
            Err(LightError::InvalidCommand(_))
        ));
    }
}
