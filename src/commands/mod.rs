// SPDX-License-Identifier: GPL-2.0-or-later
//! Command handlers for the CLI application.
//!
//! - `run`: attach and forward to a virtual HID device
//! - `monitor`: attach and print decoded reports
//! - `query`: read-only commands (list, descriptor)

pub mod monitor;
pub mod query;
pub mod run;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;
