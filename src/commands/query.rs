// SPDX-License-Identifier: GPL-2.0-or-later
//! Query (read-only) command handlers.

use std::path::Path;

use anyhow::Context;
use hidapi::HidApi;
use m708_driver::devices::INTERFACE_DIGITIZER;
use m708_driver::{report_fixup, DriverConfig, Stream};
use m708_transport::{Collection, Field, ReportDescriptor, ReportKind};

use super::CommandResult;

/// List matching HID interfaces and whether the driver would bind them
pub fn list(config: &DriverConfig) -> CommandResult {
    let api = HidApi::new().context("failed to initialize hidapi")?;
    let interfaces = m708_driver::driver::discover(&api, config)?;

    println!("Found {} interface(s):", interfaces.len());
    for iface in &interfaces {
        let info = &iface.info;
        let status = if info.interface_number == INTERFACE_DIGITIZER {
            "digitizer"
        } else {
            "ignored"
        };
        println!(
            "  {:04X}:{:04X} if={} page={:04X} usage={:04X} [{}] {} {}",
            info.vid,
            info.pid,
            info.interface_number,
            iface.usage_page,
            iface.usage,
            status,
            info.product_name.as_deref().unwrap_or("-"),
            info.device_path
        );
    }
    Ok(())
}

/// Show the corrected descriptor, or the fixup result for a descriptor file
pub fn descriptor(file: Option<&Path>, hex: bool) -> CommandResult {
    let original = match file {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
        }
        None => m708_driver::M708_RDESC_FIXED.to_vec(),
    };
    let rdesc = report_fixup(&original);

    if file.is_some() {
        if rdesc.len() == original.len() {
            println!("{} bytes: left unchanged", original.len());
        } else {
            println!("{} bytes: replaced with {} bytes", original.len(), rdesc.len());
        }
    }

    if hex {
        for chunk in rdesc.chunks(16) {
            let line: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
            println!("{}", line.join(" "));
        }
        return Ok(());
    }

    let parsed = ReportDescriptor::parse(rdesc).context("descriptor does not parse")?;
    for app in parsed.applications() {
        print_collection(app, 0);
    }
    for kind in [ReportKind::Input, ReportKind::Output, ReportKind::Feature] {
        for report in parsed.reports(kind) {
            let stream = Stream::from_report_id(report.id)
                .map(|s| format!(" ({s:?})"))
                .unwrap_or_default();
            println!(
                "{:?} report {}{}: {} bytes, {} field(s)",
                kind,
                report.id,
                stream,
                report.size_bytes(),
                report.fields.len()
            );
            for field in &report.fields {
                print_field(field);
            }
        }
    }
    Ok(())
}

fn print_field(field: &Field) {
    let first = field.usages.first().copied().unwrap_or(0);
    let mut attrs = vec![if field.is_constant() { "Const" } else { "Data" }];
    attrs.push(if field.is_variable() { "Var" } else { "Array" });
    if field.has_null_state() {
        attrs.push("Null");
    }
    println!(
        "  bit {:3}: {}x{} usage {:04X}:{:04X}{} logical {}..{} [{}]",
        field.bit_offset,
        field.report_count,
        field.report_size,
        first >> 16,
        first & 0xFFFF,
        if field.usages.len() > 1 { "+" } else { "" },
        field.logical_minimum,
        field.logical_maximum,
        attrs.join(",")
    );
}

fn print_collection(collection: &Collection, depth: usize) {
    println!(
        "{:indent$}{:?} collection {:04X}:{:04X}",
        "",
        collection.kind,
        collection.usage_page,
        collection.usage,
        indent = depth * 2
    );
    for child in &collection.children {
        print_collection(child, depth + 1);
    }
}
