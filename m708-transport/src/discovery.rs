// SPDX-License-Identifier: GPL-2.0-or-later
//! Device discovery for supported tablets

use hidapi::HidApi;
use tracing::debug;

use crate::error::TransportError;
use crate::types::{DiscoveredInterface, TransportDeviceInfo};

/// HID interface discovery by VID/PID
///
/// Lists every HID interface of every matching device. Choosing which
/// interface to bind is left to the caller.
#[derive(Debug, Clone, Default)]
pub struct HidDiscovery {
    /// Known VID/PID pairs to look for
    known_devices: Vec<(u16, u16)>,
}

impl HidDiscovery {
    /// Create a discovery instance for the given VID/PID pairs
    pub fn new(known_devices: &[(u16, u16)]) -> Self {
        Self {
            known_devices: known_devices.to_vec(),
        }
    }

    /// Check if a device matches our known devices
    pub fn is_known_device(&self, vid: u16, pid: u16) -> bool {
        self.known_devices.contains(&(vid, pid))
    }

    /// List the HID interfaces of every connected known device
    pub fn list_interfaces(&self, api: &HidApi) -> Result<Vec<DiscoveredInterface>, TransportError> {
        let mut found = Vec::new();

        for device_info in api.device_list() {
            let vid = device_info.vendor_id();
            let pid = device_info.product_id();

            if !self.is_known_device(vid, pid) {
                continue;
            }

            let path = device_info.path().to_string_lossy().to_string();
            debug!(
                "Found interface: VID={:04X} PID={:04X} iface={} page={:04X} usage={:04X} path={}",
                vid,
                pid,
                device_info.interface_number(),
                device_info.usage_page(),
                device_info.usage(),
                path
            );

            found.push(DiscoveredInterface {
                info: TransportDeviceInfo {
                    vid,
                    pid,
                    interface_number: device_info.interface_number(),
                    device_path: path,
                    serial: device_info.serial_number().map(|s| s.to_string()),
                    product_name: device_info.product_string().map(|s| s.to_string()),
                },
                usage_page: device_info.usage_page(),
                usage: device_info.usage(),
            });
        }

        // hidraw backends report one entry per top-level collection; keep one per path
        found.sort_by(|a, b| a.info.device_path.cmp(&b.info.device_path));
        found.dedup_by(|a, b| a.info.device_path == b.info.device_path);

        if found.is_empty() {
            return Err(TransportError::DeviceNotFound(format!(
                "no interface matching {}",
                self.known_devices
                    .iter()
                    .map(|(v, p)| format!("{v:04X}:{p:04X}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        Ok(found)
    }
}
