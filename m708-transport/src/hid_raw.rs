// SPDX-License-Identifier: GPL-2.0-or-later
//! hidapi transport for the tablet's digitizer interface

use std::ffi::CString;

use hidapi::{HidApi, HidDevice};
use tracing::debug;

use crate::error::TransportError;
use crate::types::TransportDeviceInfo;
use crate::Transport;

/// Largest report descriptor HID 1.11 allows
const MAX_REPORT_DESCRIPTOR_SIZE: usize = 4096;

/// HID transport for one opened interface
///
/// Only one thread reads from a device at a time; the driver loop owns the
/// transport for the lifetime of the attachment.
pub struct HidrawTransport {
    device: HidDevice,
    info: TransportDeviceInfo,
}

impl HidrawTransport {
    /// Wrap an already opened device
    pub fn new(device: HidDevice, info: TransportDeviceInfo) -> Self {
        Self { device, info }
    }

    /// Open the interface at `info.device_path`
    pub fn open(api: &HidApi, info: TransportDeviceInfo) -> Result<Self, TransportError> {
        let path = CString::new(info.device_path.as_bytes())
            .map_err(|_| TransportError::DeviceNotFound(info.device_path.clone()))?;
        let device = api.open_path(&path)?;
        debug!(
            "Opened {:04X}:{:04X} interface {} at {}",
            info.vid, info.pid, info.interface_number, info.device_path
        );
        Ok(Self::new(device, info))
    }
}

impl Transport for HidrawTransport {
    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }

    fn report_descriptor(&self) -> Result<Vec<u8>, TransportError> {
        let mut buf = vec![0u8; MAX_REPORT_DESCRIPTOR_SIZE];
        let len = self.device.get_report_descriptor(&mut buf)?;
        buf.truncate(len);
        debug!("Report descriptor: {} bytes", len);
        Ok(buf)
    }

    fn read_input(&self, buf: &mut [u8], timeout_ms: i32) -> Result<usize, TransportError> {
        Ok(self.device.read_timeout(buf, timeout_ms)?)
    }

    fn write_output(&self, data: &[u8]) -> Result<(), TransportError> {
        debug!("Output report: {:02X?}", data);
        let written = self.device.write(data)?;
        if written < data.len() {
            return Err(TransportError::ShortWrite {
                written,
                expected: data.len(),
            });
        }
        Ok(())
    }
}
