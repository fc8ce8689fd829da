// SPDX-License-Identifier: GPL-2.0-or-later
//! uhid consumer: re-exposes the tablet to the kernel with a corrected descriptor
//!
//! The kernel's generic HID stack parses the descriptor handed to
//! [`ReportSink::start`] and turns the classified reports written to the
//! virtual device into pen and keypad input events.
//!
//! The kernel also talks back through the device: lifecycle events,
//! output reports written to the virtual hidraw node, and GET_REPORT
//! requests. [`ReportSink::poll_output`] drains them without blocking and
//! hands output reports back for forwarding to the tablet. GET_REPORT is
//! answered with EIO since the tablet declares no feature reports.

use std::fs::File;

use tracing::{debug, trace, warn};
use uhid_virt::{Bus, CreateParams, OutputEvent, StreamError, UHIDDevice};

use crate::error::TransportError;
use crate::types::TransportDeviceInfo;
use crate::ReportSink;

/// errno sent back for requests the tablet cannot serve
const EIO: u16 = 5;

/// Virtual HID device created through `/dev/uhid`
#[derive(Default)]
pub struct UhidSink {
    device: Option<UHIDDevice<File>>,
}

impl UhidSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportSink for UhidSink {
    fn start(&mut self, info: &TransportDeviceInfo, rdesc: &[u8]) -> Result<(), TransportError> {
        let name = info
            .product_name
            .clone()
            .unwrap_or_else(|| format!("{:04X}:{:04X}", info.vid, info.pid));

        let device = UHIDDevice::create(CreateParams {
            name: format!("{name} (corrected)"),
            phys: info.device_path.clone(),
            uniq: info.serial.clone().unwrap_or_default(),
            bus: Bus::USB,
            vendor: info.vid as u32,
            product: info.pid as u32,
            version: 0,
            country: 0,
            rd_data: rdesc.to_vec(),
        })?;

        debug!("Created uhid device for {} ({} byte descriptor)", name, rdesc.len());
        self.device = Some(device);
        Ok(())
    }

    fn deliver(&mut self, report: &[u8]) -> Result<(), TransportError> {
        let device = self.device.as_mut().ok_or(TransportError::NotStarted)?;
        device.write(report)?;
        Ok(())
    }

    fn poll_output(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let Some(device) = self.device.as_mut() else {
            return Ok(None);
        };

        loop {
            let event = match device.read() {
                Ok(event) => event,
                Err(StreamError::Io(e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    return Ok(None)
                }
                Err(StreamError::Io(e)) => return Err(TransportError::Io(e)),
                Err(StreamError::UnknownEventType(t)) => {
                    debug!("Unknown uhid event type {:?}", t);
                    continue;
                }
            };

            match event {
                OutputEvent::Output { data } => {
                    trace!("Output report from kernel: {:02X?}", data);
                    return Ok(Some(data));
                }
                OutputEvent::GetReport {
                    id, report_number, ..
                } => {
                    debug!("Refusing GET_REPORT for report {}", report_number);
                    device.write_get_report_reply(id, EIO, Vec::new())?;
                }
                OutputEvent::SetReport { report_number, .. } => {
                    warn!("Ignoring SET_REPORT for report {}", report_number);
                }
                OutputEvent::Start { .. } => debug!("uhid device started"),
                OutputEvent::Stop => debug!("uhid device stopped"),
                OutputEvent::Open => debug!("uhid device opened"),
                OutputEvent::Close => debug!("uhid device closed"),
            }
        }
    }

    fn stop(&mut self) -> Result<(), TransportError> {
        if let Some(mut device) = self.device.take() {
            debug!("Destroying uhid device");
            device.destroy()?;
        }
        Ok(())
    }
}

impl Drop for UhidSink {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to destroy uhid device: {}", e);
        }
    }
}
