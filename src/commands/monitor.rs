// SPDX-License-Identifier: GPL-2.0-or-later
//! Monitor command: print classified reports instead of forwarding them

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Context;
use m708_driver::report::{expected_len, TabletEvent};
use m708_driver::DriverConfig;
use m708_transport::{ReportSink, TransportDeviceInfo, TransportError};
use serde::Serialize;
use tracing::warn;

use super::CommandResult;

/// Output options for the monitor
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintOptions {
    pub json: bool,
    pub hex: bool,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    #[serde(flatten)]
    event: &'a TabletEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<String>,
}

fn hex_string(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Report consumer that writes one line per report to stdout
pub struct PrintSink {
    options: PrintOptions,
}

impl PrintSink {
    pub fn new(options: PrintOptions) -> Self {
        Self { options }
    }

    /// Render one report as it will be printed
    pub fn format(&self, report: &[u8]) -> Result<String, serde_json::Error> {
        let event = TabletEvent::decode(report);
        if let Some(stream) = event.stream() {
            if report.len() != expected_len(stream) {
                warn!(
                    "{:?} report is {} bytes, expected {}",
                    stream,
                    report.len(),
                    expected_len(stream)
                );
            }
        }

        if self.options.json {
            let line = JsonLine {
                event: &event,
                raw: self.options.hex.then(|| hex_string(report)),
            };
            return serde_json::to_string(&line);
        }

        Ok(if self.options.hex {
            format!("{:<30} {event}", hex_string(report))
        } else {
            event.to_string()
        })
    }
}

impl ReportSink for PrintSink {
    fn start(&mut self, info: &TransportDeviceInfo, rdesc: &[u8]) -> Result<(), TransportError> {
        if !self.options.json {
            println!(
                "Monitoring {:04X}:{:04X} {} ({}-byte descriptor), Ctrl-C to stop",
                info.vid,
                info.pid,
                info.product_name.as_deref().unwrap_or("tablet"),
                rdesc.len()
            );
        }
        Ok(())
    }

    fn deliver(&mut self, report: &[u8]) -> Result<(), TransportError> {
        match self.format(report) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!("Failed to encode report: {}", e),
        }
        Ok(())
    }
}

pub fn monitor(config: &DriverConfig, options: PrintOptions, stop: Arc<AtomicBool>) -> CommandResult {
    m708_driver::driver::run(config, move || PrintSink::new(options), stop)
        .context("failed to monitor tablet")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use m708_driver::report_id;

    const KEYPAD: [u8; 10] = [report_id::KEYPAD, 0xF0, 0x02, 0, 0, 0, 0, 0, 0, 0];

    #[test]
    fn test_text_line() {
        let sink = PrintSink::new(PrintOptions::default());
        assert_eq!(sink.format(&KEYPAD).unwrap(), "keypad [2]");
    }

    #[test]
    fn test_json_line_with_hex() {
        let sink = PrintSink::new(PrintOptions {
            json: true,
            hex: true,
        });
        assert_eq!(
            sink.format(&KEYPAD).unwrap(),
            r#"{"stream":"keypad","buttons":[2],"raw":"06 f0 02 00 00 00 00 00 00 00"}"#
        );
    }

    #[test]
    fn test_hex_prefix() {
        let sink = PrintSink::new(PrintOptions {
            json: false,
            hex: true,
        });
        let line = sink.format(&KEYPAD).unwrap();
        assert!(line.starts_with("06 f0 02"));
        assert!(line.ends_with("keypad [2]"));
    }
}
