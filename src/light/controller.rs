use std::time::Duration;

use crate::light::command::LightCommand;
use crate::light::error::LightResult;

/// Default BLE scan window.
pub const DEFAULT_SCAN_WINDOW: Duration = Duration::from_millis(5000);

/// Parameters for the bounded discovery scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Exact device address to match. When unset, the first device advertising
    /// `manufacturer_id` wins.
    pub address: Option<String>,
    /// Manufacturer identifier expected in the advertisement data
    pub manufacturer_id: u16,
    /// How long to scan before giving up with `DeviceNotFound`
    pub scan_window: Duration,
}

impl ScanOptions {
    pub fn new(manufacturer_id: u16) -> Self {
        Self {
            address: None,
            manufacturer_id,
            scan_window: DEFAULT_SCAN_WINDOW,
        }
    }

    pub fn address(mut self, address: Option<String>) -> Self {
        self.address = address;
        self
    }

    pub fn scan_window(mut self, scan_window: Duration) -> Self {
        self.scan_window = scan_window;
        self
    }
}

/// Discovers a light and hands back a controllable handle.
pub trait LightScanner {
    type Light: LightControl;

    /// Scans for at most `options.scan_window`, stopping at the first match.
    ///
    /// Fails with `LightError::DeviceNotFound` when the window elapses without one.
    fn connect(&mut self, options: &ScanOptions) -> LightResult<Self::Light>;
}

/// A discovered light.
pub trait LightControl {
    /// Writes one HSI command, connecting first if needed. Nothing is read back.
    fn set_color(&mut self, command: &LightCommand) -> LightResult<()>;

    /// Drops the connection if there is one. Safe to call repeatedly.
    fn disconnect(&mut self) -> LightResult<()>;
}

/// Decides whether an advertisement belongs to the light we want.
///
/// An explicit address filter takes precedence over the manufacturer match and is
/// compared case-insensitively.
pub fn advertisement_matches<I>(address: &str, manufacturer_ids: I, options: &ScanOptions) -> bool
where
    I: IntoIterator<Item = u16>,
{
    match &options.address {
        Some(wanted) => wanted.eq_ignore_ascii_case(address),
        None => manufacturer_ids
            .into_iter()
            .any(|id| id == options.manufacturer_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_by_manufacturer_without_filter() {
        let options = ScanOptions::new(52977);
        assert!(advertisement_matches("AA:BB:CC:DD:EE:FF", [76, 52977], &options));
        assert!(!advertisement_matches("AA:BB:CC:DD:EE:FF", [76], &options));
        assert!(!advertisement_matches("AA:BB:CC:DD:EE:FF", [], &options));
    }

    #[test]
    fn test_address_filter_overrides_manufacturer() {
        let options = ScanOptions::new(52977).address(Some("aa:bb:cc:dd:ee:ff".to_string()));
        assert!(advertisement_matches("AA:BB:CC:DD:EE:FF", [], &options));
        assert!(!advertisement_matches("11:22:33:44:55:66", [52977], &options));
    }

    #[test]
    fn test_scan_options_defaults() {
        let options = ScanOptions::new(1).scan_window(Duration::from_millis(250));
        assert_eq!(options.scan_window, Duration::from_millis(250));
        assert!(options.address.is_none());
        assert_eq!(ScanOptions::new(1).scan_window, DEFAULT_SCAN_WINDOW);
    }
}
