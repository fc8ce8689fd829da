// SPDX-License-Identifier: GPL-2.0-or-later
//! Default command: drive the tablet through a uhid virtual device

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use m708_driver::DriverConfig;

use super::CommandResult;

#[cfg(all(target_os = "linux", feature = "uhid"))]
pub fn run(config: &DriverConfig, stop: Arc<AtomicBool>) -> CommandResult {
    use anyhow::Context;
    use m708_transport::UhidSink;
    use tracing::info;

    let served = m708_driver::driver::run(config, UhidSink::new, stop)
        .context("failed to start tablet driver")?;
    info!("Served {} interface(s)", served);
    Ok(())
}

#[cfg(not(all(target_os = "linux", feature = "uhid")))]
pub fn run(_config: &DriverConfig, _stop: Arc<AtomicBool>) -> CommandResult {
    anyhow::bail!("forwarding needs Linux uhid support; use `monitor` instead")
}
