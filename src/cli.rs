// SPDX-License-Identifier: GPL-2.0-or-later
// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use m708_driver::config::{DriverConfig, DEFAULT_READ_TIMEOUT_MS};
use m708_driver::devices::{PRODUCT_ID_M708_V2, VENDOR_ID};

/// Parse a u16 given in decimal or 0x-prefixed hex
fn parse_id(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid USB id '{s}': {e}"))
}

#[derive(Parser)]
#[command(name = "m708-driver")]
#[command(author, version, about = "UGEE M708 V2 graphics tablet driver")]
#[command(propagate_version = true)]
pub struct Cli {
    /// USB vendor ID (hex with 0x prefix, or decimal)
    #[arg(long, global = true, value_parser = parse_id, default_value_t = VENDOR_ID)]
    pub vid: u16,

    /// USB product ID (hex with 0x prefix, or decimal)
    #[arg(long, global = true, value_parser = parse_id, default_value_t = PRODUCT_ID_M708_V2)]
    pub pid: u16,

    /// Skip the extended-mode handshake
    #[arg(long, global = true)]
    pub no_activate: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            vid: self.vid,
            pid: self.pid,
            activate: !self.no_activate,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Attach the tablet and forward reports to a virtual HID device (default)
    Run,

    /// Attach the tablet and print decoded reports
    #[command(visible_aliases = ["mon", "m"])]
    Monitor {
        /// One JSON object per report
        #[arg(long)]
        json: bool,

        /// Show raw hex dump alongside decoded output
        #[arg(long)]
        hex: bool,
    },

    /// List matching HID interfaces
    #[command(visible_alias = "ls")]
    List,

    /// Show the corrected report descriptor
    #[command(visible_aliases = ["rdesc", "desc"])]
    Descriptor {
        /// Run the fixup over a raw descriptor file instead
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Dump raw bytes instead of the parsed layout
        #[arg(long)]
        hex: bool,
    },
}
