// SPDX-License-Identifier: GPL-2.0-or-later
// UGEE M708 V2 Linux Driver - Shared Library
// Descriptor fixup, report classification, activation and the driver loop

pub mod activation;
pub mod attach;
pub mod classify;
pub mod config;
pub mod devices;
pub mod driver;
pub mod rdesc;
pub mod report;

pub use activation::{activate, ActivationError, ActivationState, OutputReports};
pub use attach::{attach, AttachError, AttachOptions, AttachedDevice};
pub use classify::{classify_raw_event, report_id, Stream};
pub use config::DriverConfig;
pub use devices::{accept_interface, is_supported, SUPPORTED_DEVICES};
pub use rdesc::{report_fixup, M708_RDESC_FIXED, M708_RDESC_ORIG_SIZE};
pub use report::{KeypadReport, PenReport, TabletEvent};
