// SPDX-License-Identifier: GPL-2.0-or-later
//! Driver configuration, assembled from the command line

use serde::Serialize;

use crate::devices;

/// Default input read timeout; bounds how quickly Ctrl-C is noticed
pub const DEFAULT_READ_TIMEOUT_MS: i32 = 250;

/// Runtime settings for attaching and driving tablets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverConfig {
    /// USB vendor ID to match
    pub vid: u16,
    /// USB product ID to match
    pub pid: u16,
    /// Send the extended-mode handshake after attaching
    pub activate: bool,
    /// Input read timeout in milliseconds
    pub read_timeout_ms: i32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            vid: devices::VENDOR_ID,
            pid: devices::PRODUCT_ID_M708_V2,
            activate: true,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl DriverConfig {
    /// VID/PID pairs to look for: the built-in table plus the configured pair
    pub fn known_devices(&self) -> Vec<(u16, u16)> {
        let mut known = devices::SUPPORTED_DEVICES.to_vec();
        if !known.contains(&(self.vid, self.pid)) {
            known.push((self.vid, self.pid));
        }
        known
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_registry() {
        let config = DriverConfig::default();
        assert!(devices::is_supported(config.vid, config.pid));
        assert!(config.activate);
        assert_eq!(config.known_devices(), devices::SUPPORTED_DEVICES.to_vec());
    }

    #[test]
    fn test_override_is_added_once() {
        let config = DriverConfig {
            pid: 0x0078,
            ..Default::default()
        };
        let known = config.known_devices();
        assert!(known.contains(&(devices::VENDOR_ID, 0x0078)));
        assert_eq!(known.len(), devices::SUPPORTED_DEVICES.len() + 1);
    }
}
