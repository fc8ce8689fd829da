// SPDX-License-Identifier: GPL-2.0-or-later
//! Extended reporting mode handshake
//!
//! Until it receives output report 2 carrying `B0 04 00 00 00 00 00`, the
//! tablet stays in a reduced mode. The sequence was discovered by sniffing
//! the vendor's Windows driver.

use m708_transport::{Report, TransportError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::classify::report_id;

/// Payload written into the first field of output report 2
pub const ACTIVATION_MAGIC: [u8; 7] = [0xB0, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00];

/// Activation failures; none of them stop the device from being used
#[derive(Error, Debug)]
pub enum ActivationError {
    #[error("tablet-enabling output report {0} not found")]
    ReportNotFound(u8),

    #[error("invalid tablet-enabling output report {id}: {fields} field(s), {count} value slot(s)")]
    ReportMalformed { id: u8, fields: usize, count: u32 },

    #[error("failed to send tablet-enabling report: {0}")]
    Transfer(#[from] TransportError),
}

/// Per-device activation state, set once right after the transport starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationState {
    #[default]
    NotActivated,
    Activated,
    /// Handshake failed; the device still delivers baseline reports
    Failed,
}

/// Device side of the handshake: its output report catalogue and a way to
/// send one of those reports
pub trait OutputReports {
    /// Output reports declared by the active descriptor
    fn output_reports(&mut self) -> &mut [Report];

    /// Issue a SET_REPORT (output) transfer with the packed report
    fn set_report(&mut self, data: &[u8]) -> Result<(), TransportError>;
}

/// Switch the tablet into extended reporting mode
pub fn activate<D: OutputReports + ?Sized>(device: &mut D) -> Result<(), ActivationError> {
    let report = match device
        .output_reports()
        .iter_mut()
        .find(|r| r.id == report_id::VENDOR)
    {
        Some(report) => report,
        None => {
            error!("tablet-enabling output report not found");
            return Err(ActivationError::ReportNotFound(report_id::VENDOR));
        }
    };

    let count = report.fields.first().map_or(0, |f| f.report_count);
    if report.fields.is_empty() || (count as usize) < ACTIVATION_MAGIC.len() {
        error!("invalid tablet-enabling output report");
        return Err(ActivationError::ReportMalformed {
            id: report.id,
            fields: report.fields.len(),
            count,
        });
    }

    let field = &mut report.fields[0];
    for (slot, &byte) in field.values.iter_mut().zip(ACTIVATION_MAGIC.iter()) {
        *slot = byte as i32;
    }
    let data = report.to_bytes();

    device.set_report(&data)?;
    info!("Sent tablet-enabling report {:02X?}", data);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use m708_transport::{ReportDescriptor, ReportKind};

    use crate::rdesc::M708_RDESC_FIXED;

    /// Output catalogue backed by a parsed descriptor; records every transfer
    struct FakeDevice {
        descriptor: ReportDescriptor,
        sent: Vec<Vec<u8>>,
        fail: bool,
    }

    impl FakeDevice {
        fn new(rdesc: &[u8]) -> Self {
            Self {
                descriptor: ReportDescriptor::parse(rdesc).unwrap(),
                sent: Vec::new(),
                fail: false,
            }
        }
    }

    impl OutputReports for FakeDevice {
        fn output_reports(&mut self) -> &mut [Report] {
            self.descriptor.reports_mut(ReportKind::Output)
        }

        fn set_report(&mut self, data: &[u8]) -> Result<(), TransportError> {
            if self.fail {
                return Err(TransportError::Disconnected);
            }
            self.sent.push(data.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_activation_writes_magic() {
        let mut device = FakeDevice::new(&M708_RDESC_FIXED);
        activate(&mut device).unwrap();

        let field = &device.descriptor.output[0].fields[0];
        assert_eq!(&field.values[..7], &[0xB0, 0x04, 0, 0, 0, 0, 0]);
        assert_eq!(
            device.sent,
            vec![vec![0x02, 0xB0, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]]
        );
    }

    #[test]
    fn test_missing_report() {
        // Vendor collection with only an input report
        let rdesc = [
            0x06, 0x0A, 0xFF, 0x09, 0x01, 0xA1, 0x01, 0x85, 0x02, 0x09, 0x02, 0x75, 0x08, 0x95,
            0x09, 0x81, 0x02, 0xC0,
        ];
        let mut device = FakeDevice::new(&rdesc);
        assert!(matches!(
            activate(&mut device),
            Err(ActivationError::ReportNotFound(2))
        ));
        assert!(device.sent.is_empty());
    }

    #[test]
    fn test_wrong_id_is_not_found() {
        let rdesc = [
            0x06, 0x0A, 0xFF, 0x09, 0x01, 0xA1, 0x01, 0x85, 0x03, 0x09, 0x03, 0x75, 0x08, 0x95,
            0x09, 0x91, 0x02, 0xC0,
        ];
        let mut device = FakeDevice::new(&rdesc);
        assert!(matches!(
            activate(&mut device),
            Err(ActivationError::ReportNotFound(_))
        ));
    }

    #[test]
    fn test_short_report_is_malformed() {
        // Output report 2 with only 6 value slots
        let rdesc = [
            0x06, 0x0A, 0xFF, 0x09, 0x01, 0xA1, 0x01, 0x85, 0x02, 0x09, 0x03, 0x75, 0x08, 0x95,
            0x06, 0x91, 0x02, 0xC0,
        ];
        let mut device = FakeDevice::new(&rdesc);
        assert!(matches!(
            activate(&mut device),
            Err(ActivationError::ReportMalformed {
                id: 2,
                fields: 1,
                count: 6
            })
        ));
        assert!(device.sent.is_empty());
    }

    #[test]
    fn test_padding_only_report_is_malformed() {
        // Output report 2 exists but has no usages, so no fields
        let rdesc = [
            0x06, 0x0A, 0xFF, 0x09, 0x01, 0xA1, 0x01, 0x85, 0x02, 0x75, 0x08, 0x95, 0x09, 0x91,
            0x03, 0xC0,
        ];
        let mut device = FakeDevice::new(&rdesc);
        assert!(matches!(
            activate(&mut device),
            Err(ActivationError::ReportMalformed { fields: 0, .. })
        ));
    }

    #[test]
    fn test_transfer_failure_is_reported() {
        let mut device = FakeDevice::new(&M708_RDESC_FIXED);
        device.fail = true;
        assert!(matches!(
            activate(&mut device),
            Err(ActivationError::Transfer(TransportError::Disconnected))
        ));
    }
}
