// SPDX-License-Identifier: GPL-2.0-or-later
//! Device attachment and report forwarding
//!
//! Attach order is fixed: interface gate, descriptor fetch, descriptor
//! fixup, layout parse, consumer start, activation. Only the steps before
//! activation can fail the attachment; a failed handshake leaves the device
//! usable in its baseline mode.

use std::sync::atomic::{AtomicBool, Ordering};

use m708_transport::{
    DescriptorError, Report, ReportDescriptor, ReportKind, ReportSink, Transport,
    TransportDeviceInfo, TransportError, INPUT_REPORT_SIZE,
};
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

use crate::activation::{activate, ActivationState, OutputReports};
use crate::classify::classify_raw_event;
use crate::devices::accept_interface;
use crate::rdesc::report_fixup;

/// Reasons an attachment is abandoned
#[derive(Error, Debug)]
pub enum AttachError {
    /// Not the digitizer interface; other interfaces stay available
    #[error("interface {0} is not the digitizer interface")]
    WrongInterface(i32),

    #[error("failed to fetch report descriptor: {0}")]
    DescriptorFetch(#[source] TransportError),

    #[error("report descriptor parse failed: {0}")]
    DescriptorParse(#[from] DescriptorError),

    #[error("hw start failed: {0}")]
    TransportStart(#[source] TransportError),

    /// Attached, then lost while forwarding reports
    #[error("report forwarding failed: {0}")]
    Forwarding(#[source] TransportError),
}

/// Attach-time switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachOptions {
    /// Send the extended-mode handshake
    pub activate: bool,
}

impl Default for AttachOptions {
    fn default() -> Self {
        Self { activate: true }
    }
}

/// A tablet interface bound to a report consumer
pub struct AttachedDevice<T: Transport, S: ReportSink> {
    transport: T,
    sink: S,
    descriptor: ReportDescriptor,
    activation: ActivationState,
    /// Sized for the longest input report the descriptor declares
    input_buf: Vec<u8>,
}

/// Bind a tablet interface to a consumer
pub fn attach<T: Transport, S: ReportSink>(
    transport: T,
    mut sink: S,
    options: AttachOptions,
) -> Result<AttachedDevice<T, S>, AttachError> {
    let info = transport.device_info().clone();

    if !accept_interface(info.interface_number) {
        return Err(AttachError::WrongInterface(info.interface_number));
    }

    let original = transport
        .report_descriptor()
        .map_err(AttachError::DescriptorFetch)?;
    let rdesc = report_fixup(&original);

    let descriptor = ReportDescriptor::parse(rdesc).map_err(|e| {
        error!("parse failed: {}", e);
        e
    })?;

    sink.start(&info, rdesc).map_err(|e| {
        error!("hw start failed: {}", e);
        AttachError::TransportStart(e)
    })?;

    let input_len = descriptor
        .reports(ReportKind::Input)
        .iter()
        .map(|r| r.size_bytes())
        .fold(INPUT_REPORT_SIZE, usize::max);
    debug!("Input buffer: {} bytes", input_len);

    let mut device = AttachedDevice {
        transport,
        sink,
        descriptor,
        activation: ActivationState::NotActivated,
        input_buf: vec![0; input_len],
    };

    if options.activate {
        device.activation = match activate(&mut device) {
            Ok(()) => ActivationState::Activated,
            Err(e) => {
                warn!("Activation failed, continuing in baseline mode: {}", e);
                ActivationState::Failed
            }
        };
    } else {
        info!("Skipping tablet activation");
    }

    info!(
        "Attached {:04X}:{:04X} interface {} ({:?})",
        info.vid, info.pid, info.interface_number, device.activation
    );
    Ok(device)
}

impl<T: Transport, S: ReportSink> OutputReports for AttachedDevice<T, S> {
    fn output_reports(&mut self) -> &mut [Report] {
        self.descriptor.reports_mut(ReportKind::Output)
    }

    fn set_report(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.transport.write_output(data)
    }
}

impl<T: Transport, S: ReportSink> AttachedDevice<T, S> {
    pub fn device_info(&self) -> &TransportDeviceInfo {
        self.transport.device_info()
    }

    /// Report layout of the descriptor the consumer was started with
    pub fn descriptor(&self) -> &ReportDescriptor {
        &self.descriptor
    }

    pub fn activation(&self) -> ActivationState {
        self.activation
    }

    /// Classify one raw input report in place and hand it to the consumer
    pub fn process_input(&mut self, data: &mut [u8]) -> Result<(), TransportError> {
        classify_raw_event(data, ReportKind::Input);
        trace!("Input report: {:02X?}", data);
        self.sink.deliver(data)
    }

    /// Send every output report the consumer has queued to the tablet
    pub fn forward_output(&mut self) -> Result<usize, TransportError> {
        let mut sent = 0;
        while let Some(report) = self.sink.poll_output()? {
            self.transport.write_output(&report)?;
            sent += 1;
        }
        Ok(sent)
    }

    /// Read and forward at most one input report, then flush pending output
    ///
    /// # Returns
    /// `false` on read timeout
    pub fn pump(&mut self, timeout_ms: i32) -> Result<bool, TransportError> {
        let mut buf = std::mem::take(&mut self.input_buf);
        let read = self.transport.read_input(&mut buf, timeout_ms);
        let result = match read {
            Ok(0) => Ok(false),
            Ok(len) => self.process_input(&mut buf[..len]).map(|()| true),
            Err(e) => Err(e),
        };
        self.input_buf = buf;

        let forwarded = result?;
        self.forward_output()?;
        Ok(forwarded)
    }

    /// Forward reports until `stop` is set or the transport fails
    ///
    /// # Returns
    /// Number of reports forwarded
    pub fn run(&mut self, stop: &AtomicBool, timeout_ms: i32) -> Result<u64, TransportError> {
        let mut forwarded = 0u64;
        while !stop.load(Ordering::SeqCst) {
            if self.pump(timeout_ms)? {
                forwarded += 1;
            }
        }
        debug!("Stop requested after {} reports", forwarded);
        Ok(forwarded)
    }

    /// Stop the consumer and release the device
    pub fn detach(mut self) -> Result<(), TransportError> {
        info!("Detaching {}", self.transport.device_info().device_path);
        self.sink.stop()
    }
}
