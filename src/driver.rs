// SPDX-License-Identifier: GPL-2.0-or-later
//! Driver loop: discover, attach and forward, one thread per interface

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread::JoinHandle;

use hidapi::HidApi;
use m708_transport::{
    DiscoveredInterface, HidDiscovery, HidrawTransport, ReportSink, Transport, TransportError,
};
use tracing::{debug, error, info, warn};

use crate::attach::{attach, AttachError, AttachOptions};
use crate::config::DriverConfig;
use crate::devices::INTERFACE_DIGITIZER;

/// List the HID interfaces of every configured tablet
pub fn discover(
    api: &HidApi,
    config: &DriverConfig,
) -> Result<Vec<DiscoveredInterface>, TransportError> {
    HidDiscovery::new(&config.known_devices()).list_interfaces(api)
}

/// Attach one interface and forward its reports until `stop` is set
///
/// # Returns
/// Number of reports forwarded
pub fn serve<T: Transport, S: ReportSink>(
    transport: T,
    sink: S,
    config: &DriverConfig,
    stop: &AtomicBool,
) -> Result<u64, AttachError> {
    let options = AttachOptions {
        activate: config.activate,
    };
    let mut device = attach(transport, sink, options)?;

    let result = device.run(stop, config.read_timeout_ms);
    if let Err(e) = device.detach() {
        warn!("Failed to tear down consumer: {}", e);
    }
    result.map_err(AttachError::Forwarding)
}

/// Serve every digitizer interface found, blocking until all loops end
///
/// `make_sink` builds a fresh consumer per interface. Interfaces other than
/// the digitizer are skipped without being opened.
///
/// # Returns
/// Number of interfaces that were served
pub fn run<S, F>(
    config: &DriverConfig,
    make_sink: F,
    stop: Arc<AtomicBool>,
) -> Result<usize, TransportError>
where
    S: ReportSink + 'static,
    F: Fn() -> S,
{
    let api = HidApi::new()?;
    let interfaces = discover(&api, config)?;

    let mut workers: Vec<(String, JoinHandle<()>)> = Vec::new();
    for iface in interfaces {
        let info = iface.info;
        if info.interface_number != INTERFACE_DIGITIZER {
            debug!(
                "Skipping interface {} at {}",
                info.interface_number, info.device_path
            );
            continue;
        }

        let path = info.device_path.clone();
        let transport = match HidrawTransport::open(&api, info) {
            Ok(t) => t,
            Err(e) => {
                error!("{}: open failed: {}", path, e);
                continue;
            }
        };

        let sink = make_sink();
        let config = config.clone();
        let stop = Arc::clone(&stop);
        let worker_path = path.clone();
        let handle = std::thread::Builder::new()
            .name("m708-reader".into())
            .spawn(move || match serve(transport, sink, &config, &stop) {
                Ok(n) => info!("{}: stopped after {} reports", worker_path, n),
                Err(e) => error!("{}: {}", worker_path, e),
            })?;
        workers.push((path, handle));
    }

    if workers.is_empty() {
        return Err(TransportError::DeviceNotFound(format!(
            "no usable interface {INTERFACE_DIGITIZER} on any matching device"
        )));
    }

    let served = workers.len();
    for (path, handle) in workers {
        if handle.join().is_err() {
            error!("Reader for {} panicked", path);
        }
    }
    Ok(served)
}
