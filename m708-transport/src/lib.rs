// SPDX-License-Identifier: GPL-2.0-or-later
//! Transport abstraction layer for the UGEE M708 tablet driver
//!
//! This crate provides the I/O side of the driver:
//!
//! - [`Transport`]: the physical tablet (report descriptor, input reads,
//!   output writes), backed by hidapi
//! - [`ReportSink`]: the consumer of corrected reports, backed by a uhid
//!   virtual device on Linux
//! - [`descriptor`]: the report layout reader that turns a report
//!   descriptor into a catalogue of reports and fields

pub mod descriptor;
pub mod error;
pub mod types;

mod discovery;
mod hid_raw;
#[cfg(all(target_os = "linux", feature = "uhid"))]
mod uhid;

pub use descriptor::{Collection, CollectionKind, Field, Report, ReportDescriptor};
pub use discovery::HidDiscovery;
pub use error::{DescriptorError, TransportError};
pub use hid_raw::HidrawTransport;
pub use types::{DiscoveredInterface, ReportKind, TransportDeviceInfo};
#[cfg(all(target_os = "linux", feature = "uhid"))]
pub use uhid::UhidSink;

/// Size of the largest input report the tablet sends (id + 9 payload bytes)
pub const INPUT_REPORT_SIZE: usize = 10;

/// The physical device side of the driver
///
/// All calls are blocking; timeouts are the backend's own.
pub trait Transport: Send {
    /// Get device information
    fn device_info(&self) -> &TransportDeviceInfo;

    /// Fetch the report descriptor exactly as the device advertises it
    fn report_descriptor(&self) -> Result<Vec<u8>, TransportError>;

    /// Read one input report into `buf`
    ///
    /// # Returns
    /// Number of bytes read; 0 on timeout
    fn read_input(&self, buf: &mut [u8], timeout_ms: i32) -> Result<usize, TransportError>;

    /// Send an output report (SET_REPORT, output direction)
    ///
    /// `data[0]` is the report id.
    fn write_output(&self, data: &[u8]) -> Result<(), TransportError>;
}

/// The generic report consumer
pub trait ReportSink: Send {
    /// Bring the consumer up with the (possibly corrected) report descriptor
    fn start(&mut self, info: &TransportDeviceInfo, rdesc: &[u8]) -> Result<(), TransportError>;

    /// Hand one classified input report to the consumer
    fn deliver(&mut self, report: &[u8]) -> Result<(), TransportError>;

    /// Take the next output report the consumer wants sent to the device
    ///
    /// Never blocks. `Ok(None)` when nothing is pending.
    fn poll_output(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        Ok(None)
    }

    /// Tear the consumer down
    fn stop(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn device_info(&self) -> &TransportDeviceInfo {
        (**self).device_info()
    }

    fn report_descriptor(&self) -> Result<Vec<u8>, TransportError> {
        (**self).report_descriptor()
    }

    fn read_input(&self, buf: &mut [u8], timeout_ms: i32) -> Result<usize, TransportError> {
        (**self).read_input(buf, timeout_ms)
    }

    fn write_output(&self, data: &[u8]) -> Result<(), TransportError> {
        (**self).write_output(data)
    }
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn start(&mut self, info: &TransportDeviceInfo, rdesc: &[u8]) -> Result<(), TransportError> {
        (**self).start(info, rdesc)
    }

    fn deliver(&mut self, report: &[u8]) -> Result<(), TransportError> {
        (**self).deliver(report)
    }

    fn poll_output(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        (**self).poll_output()
    }

    fn stop(&mut self) -> Result<(), TransportError> {
        (**self).stop()
    }
}
