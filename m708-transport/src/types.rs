// SPDX-License-Identifier: GPL-2.0-or-later
//! Common types for transport layer

use serde::Serialize;

/// HID report direction, as used to key the report catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Device-to-host data reports
    Input,
    /// Host-to-device data reports
    Output,
    /// Bidirectional configuration reports
    Feature,
}

/// Device identification information
#[derive(Debug, Clone, Serialize)]
pub struct TransportDeviceInfo {
    /// USB Vendor ID
    pub vid: u16,
    /// USB Product ID
    pub pid: u16,
    /// USB interface number of this HID function (-1 when unknown)
    pub interface_number: i32,
    /// Device path or identifier (transport-specific)
    pub device_path: String,
    /// Serial number if available
    pub serial: Option<String>,
    /// Product name if available
    pub product_name: Option<String>,
}

/// A HID interface found during enumeration, not yet opened
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredInterface {
    pub info: TransportDeviceInfo,
    pub usage_page: u16,
    pub usage: u16,
}
