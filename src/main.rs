// SPDX-License-Identifier: GPL-2.0-or-later
//! UGEE M708 V2 Tablet Driver CLI
//!
//! Usage:
//!   m708-driver               # Attach and forward via uhid (default)
//!   m708-driver monitor       # Print decoded pen/keypad reports
//!   m708-driver list          # List matching HID interfaces
//!   m708-driver descriptor    # Show the corrected report descriptor

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;

fn setup_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Stop flag set on Ctrl-C
fn install_stop_handler() -> Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        info!("Interrupted, detaching");
        flag.store(true, Ordering::SeqCst);
    })
    .context("failed to install Ctrl-C handler")?;
    Ok(stop)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = cli.driver_config();

    match cli.command {
        None | Some(Commands::Run) => {
            let stop = install_stop_handler()?;
            commands::run::run(&config, stop)?;
        }
        Some(Commands::Monitor { json, hex }) => {
            let stop = install_stop_handler()?;
            let options = commands::monitor::PrintOptions { json, hex };
            commands::monitor::monitor(&config, options, stop)?;
        }
        Some(Commands::List) => {
            commands::query::list(&config)?;
        }
        Some(Commands::Descriptor { file, hex }) => {
            commands::query::descriptor(file.as_deref(), hex)?;
        }
    }

    Ok(())
}
