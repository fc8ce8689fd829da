// SPDX-License-Identifier: GPL-2.0-or-later
//! Report layout reader
//!
//! Walks the short items of a HID report descriptor and builds the report
//! catalogue the driver needs: top-level collections with the report ids
//! they own, and per-direction reports made of typed fields. Only the item
//! subset used by simple digitizers is understood; long items are rejected
//! and delimiters/designators/strings are ignored.
//!
//! Semantics follow the Linux HID core where HID 1.11 is loose:
//! - a Logical/Physical Maximum is read unsigned when the matching minimum
//!   is non-negative (so `26 6A C6` is 50794, not -14742)
//! - a Unit Exponent that fits in a nibble is a 4-bit signed value
//! - main items without usages are padding: they advance the bit offset
//!   but do not become fields

use serde::Serialize;

use crate::error::DescriptorError;
use crate::types::ReportKind;

/// Largest report payload accepted, in bits (Linux `HID_MAX_BUFFER_SIZE` less the id byte)
pub const MAX_REPORT_BITS: u32 = (16384 - 1) * 8;

/// Item type bits (bType)
mod item_type {
    pub const MAIN: u8 = 0;
    pub const GLOBAL: u8 = 1;
    pub const LOCAL: u8 = 2;
    pub const LONG: u8 = 0xFE;
}

/// Main item tags
mod main_tag {
    pub const INPUT: u8 = 0x8;
    pub const OUTPUT: u8 = 0x9;
    pub const COLLECTION: u8 = 0xA;
    pub const FEATURE: u8 = 0xB;
    pub const END_COLLECTION: u8 = 0xC;
}

/// Global item tags
mod global_tag {
    pub const USAGE_PAGE: u8 = 0x0;
    pub const LOGICAL_MINIMUM: u8 = 0x1;
    pub const LOGICAL_MAXIMUM: u8 = 0x2;
    pub const PHYSICAL_MINIMUM: u8 = 0x3;
    pub const PHYSICAL_MAXIMUM: u8 = 0x4;
    pub const UNIT_EXPONENT: u8 = 0x5;
    pub const UNIT: u8 = 0x6;
    pub const REPORT_SIZE: u8 = 0x7;
    pub const REPORT_ID: u8 = 0x8;
    pub const REPORT_COUNT: u8 = 0x9;
    pub const PUSH: u8 = 0xA;
    pub const POP: u8 = 0xB;
}

/// Local item tags
mod local_tag {
    pub const USAGE: u8 = 0x0;
    pub const USAGE_MINIMUM: u8 = 0x1;
    pub const USAGE_MAXIMUM: u8 = 0x2;
}

/// Main item data flags (Input/Output/Feature)
pub mod flags {
    pub const CONSTANT: u32 = 1 << 0;
    pub const VARIABLE: u32 = 1 << 1;
    pub const RELATIVE: u32 = 1 << 2;
    pub const NULL_STATE: u32 = 1 << 6;
}

/// Largest usage range expanded from Usage Minimum/Maximum
const MAX_USAGE_RANGE: u32 = 1024;

/// A single short item: tag, type and its little-endian payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ShortItem<'a> {
    offset: usize,
    kind: u8,
    tag: u8,
    data: &'a [u8],
}

impl ShortItem<'_> {
    fn udata(&self) -> u32 {
        self.data
            .iter()
            .rev()
            .fold(0u32, |acc, &b| (acc << 8) | b as u32)
    }

    fn sdata(&self) -> i32 {
        let raw = self.udata();
        match self.data.len() {
            1 => raw as u8 as i8 as i32,
            2 => raw as u16 as i16 as i32,
            _ => raw as i32,
        }
    }
}

/// Iterator over the items of a descriptor
struct Items<'a> {
    rdesc: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for Items<'a> {
    type Item = Result<ShortItem<'a>, DescriptorError>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.pos;
        let header = *self.rdesc.get(offset)?;

        if header == item_type::LONG {
            self.pos = self.rdesc.len();
            return Some(Err(DescriptorError::LongItem { offset }));
        }

        let size = match header & 0x3 {
            3 => 4,
            n => n as usize,
        };
        let start = offset + 1;
        let Some(data) = self.rdesc.get(start..start + size) else {
            self.pos = self.rdesc.len();
            return Some(Err(DescriptorError::Truncated { offset }));
        };
        self.pos = start + size;

        Some(Ok(ShortItem {
            offset,
            kind: (header >> 2) & 0x3,
            tag: header >> 4,
            data,
        }))
    }
}

/// Collection type from the Collection item payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Physical,
    Application,
    Logical,
    Other(u8),
}

impl From<u32> for CollectionKind {
    fn from(value: u32) -> Self {
        match value {
            0x00 => Self::Physical,
            0x01 => Self::Application,
            0x02 => Self::Logical,
            other => Self::Other(other as u8),
        }
    }
}

/// A collection and everything nested in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collection {
    pub kind: CollectionKind,
    pub usage_page: u16,
    pub usage: u16,
    /// Report ids of every field declared inside this collection, in order
    pub report_ids: Vec<u8>,
    pub children: Vec<Collection>,
}

/// One data field of a report (padding excluded)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub usage_page: u16,
    /// Extended usages (page << 16 | id) declared for this field
    pub usages: Vec<u32>,
    pub flags: u32,
    /// Bit offset from the first payload byte (after the report id)
    pub bit_offset: u32,
    pub report_size: u32,
    pub report_count: u32,
    pub logical_minimum: i32,
    pub logical_maximum: i32,
    pub physical_minimum: i32,
    pub physical_maximum: i32,
    pub unit: u32,
    pub unit_exponent: i32,
    /// One value slot per report count, packed by [`Report::to_bytes`]
    pub values: Vec<i32>,
}

impl Field {
    pub fn is_constant(&self) -> bool {
        self.flags & flags::CONSTANT != 0
    }

    pub fn is_variable(&self) -> bool {
        self.flags & flags::VARIABLE != 0
    }

    pub fn has_null_state(&self) -> bool {
        self.flags & flags::NULL_STATE != 0
    }
}

/// A report: an id within one direction and its fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub id: u8,
    pub kind: ReportKind,
    pub fields: Vec<Field>,
    /// Payload size in bits, padding included
    pub size_bits: u32,
}

impl Report {
    fn new(id: u8, kind: ReportKind) -> Self {
        Self {
            id,
            kind,
            fields: Vec::new(),
            size_bits: 0,
        }
    }

    /// Size on the wire in bytes, including the report id byte when numbered
    pub fn size_bytes(&self) -> usize {
        let payload = self.size_bits.div_ceil(8) as usize;
        if self.id != 0 {
            payload + 1
        } else {
            payload
        }
    }

    /// Pack field values into wire format (LSB-first bit packing)
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.size_bytes()];
        let payload = if self.id != 0 {
            buf[0] = self.id;
            &mut buf[1..]
        } else {
            &mut buf[..]
        };

        for field in &self.fields {
            for (i, &value) in field.values.iter().enumerate() {
                let offset = field.bit_offset + i as u32 * field.report_size;
                put_bits(payload, offset, field.report_size, value as u32);
            }
        }
        buf
    }
}

fn put_bits(buf: &mut [u8], offset: u32, size: u32, value: u32) {
    for bit in 0..size {
        if (value >> bit) & 1 == 0 {
            continue;
        }
        let pos = (offset + bit) as usize;
        if let Some(byte) = buf.get_mut(pos / 8) {
            *byte |= 1 << (pos % 8);
        }
    }
}

/// Global item state, saved and restored by Push/Pop
#[derive(Debug, Clone, Copy, Default)]
struct GlobalState {
    usage_page: u16,
    logical_minimum: i32,
    logical_maximum: i32,
    physical_minimum: i32,
    physical_maximum: i32,
    unit_exponent: i32,
    unit: u32,
    report_size: u32,
    report_id: u8,
    report_count: u32,
}

/// Local item state, cleared after every main item
#[derive(Debug, Clone, Default)]
struct LocalState {
    usages: Vec<u32>,
    usage_minimum: Option<u32>,
}

impl LocalState {
    fn extend_usage(&self, global: &GlobalState, item: &ShortItem<'_>) -> u32 {
        if item.data.len() == 4 {
            item.udata()
        } else {
            (global.usage_page as u32) << 16 | item.udata()
        }
    }
}

/// The parsed report catalogue of one descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportDescriptor {
    /// Top-level collections in declaration order
    pub collections: Vec<Collection>,
    pub input: Vec<Report>,
    pub output: Vec<Report>,
    pub feature: Vec<Report>,
}

impl ReportDescriptor {
    /// Read a report descriptor into its report catalogue
    pub fn parse(rdesc: &[u8]) -> Result<Self, DescriptorError> {
        if rdesc.is_empty() {
            return Err(DescriptorError::Empty);
        }

        let mut parsed = Self::default();
        let mut global = GlobalState::default();
        let mut stack: Vec<GlobalState> = Vec::new();
        let mut local = LocalState::default();
        let mut open: Vec<Collection> = Vec::new();

        for item in (Items { rdesc, pos: 0 }) {
            let item = item?;
            match item.kind {
                item_type::MAIN => {
                    match item.tag {
                        main_tag::INPUT => {
                            parsed.add_field(ReportKind::Input, &item, &global, &local, &mut open)?
                        }
                        main_tag::OUTPUT => {
                            parsed.add_field(ReportKind::Output, &item, &global, &local, &mut open)?
                        }
                        main_tag::FEATURE => {
                            parsed.add_field(ReportKind::Feature, &item, &global, &local, &mut open)?
                        }
                        main_tag::COLLECTION => {
                            let usage = local.usages.first().copied().unwrap_or(0);
                            open.push(Collection {
                                kind: CollectionKind::from(item.udata()),
                                usage_page: (usage >> 16) as u16,
                                usage: usage as u16,
                                report_ids: Vec::new(),
                                children: Vec::new(),
                            });
                        }
                        main_tag::END_COLLECTION => {
                            let closed = open.pop().ok_or(DescriptorError::UnbalancedCollection {
                                offset: item.offset,
                            })?;
                            match open.last_mut() {
                                Some(parent) => parent.children.push(closed),
                                None => parsed.collections.push(closed),
                            }
                        }
                        other => {
                            tracing::trace!("Ignoring main item tag 0x{:X} at {}", other, item.offset);
                        }
                    }
                    local = LocalState::default();
                }
                item_type::GLOBAL => match item.tag {
                    global_tag::USAGE_PAGE => global.usage_page = item.udata() as u16,
                    global_tag::LOGICAL_MINIMUM => global.logical_minimum = item.sdata(),
                    global_tag::LOGICAL_MAXIMUM => {
                        global.logical_maximum = if global.logical_minimum < 0 {
                            item.sdata()
                        } else {
                            item.udata() as i32
                        }
                    }
                    global_tag::PHYSICAL_MINIMUM => global.physical_minimum = item.sdata(),
                    global_tag::PHYSICAL_MAXIMUM => {
                        global.physical_maximum = if global.physical_minimum < 0 {
                            item.sdata()
                        } else {
                            item.udata() as i32
                        }
                    }
                    global_tag::UNIT_EXPONENT => {
                        let raw = item.sdata();
                        global.unit_exponent = if raw as u32 & 0xFFFF_FFF0 == 0 {
                            // 4-bit two's complement
                            (raw << 28) >> 28
                        } else {
                            raw
                        };
                    }
                    global_tag::UNIT => global.unit = item.udata(),
                    global_tag::REPORT_SIZE => global.report_size = item.udata(),
                    global_tag::REPORT_ID => global.report_id = item.udata() as u8,
                    global_tag::REPORT_COUNT => global.report_count = item.udata(),
                    global_tag::PUSH => stack.push(global),
                    global_tag::POP => {
                        global = stack.pop().ok_or(DescriptorError::UnbalancedPop {
                            offset: item.offset,
                        })?;
                    }
                    other => {
                        tracing::trace!("Ignoring global item tag 0x{:X} at {}", other, item.offset);
                    }
                },
                item_type::LOCAL => match item.tag {
                    local_tag::USAGE => {
                        let usage = local.extend_usage(&global, &item);
                        local.usages.push(usage);
                    }
                    local_tag::USAGE_MINIMUM => {
                        local.usage_minimum = Some(local.extend_usage(&global, &item));
                    }
                    local_tag::USAGE_MAXIMUM => {
                        let max = local.extend_usage(&global, &item);
                        if let Some(min) = local.usage_minimum.take() {
                            let end = max.min(min.saturating_add(MAX_USAGE_RANGE - 1));
                            local.usages.extend(min..=end);
                        }
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        if !open.is_empty() {
            return Err(DescriptorError::UnclosedCollection { open: open.len() });
        }

        Ok(parsed)
    }

    fn add_field(
        &mut self,
        kind: ReportKind,
        item: &ShortItem<'_>,
        global: &GlobalState,
        local: &LocalState,
        open: &mut [Collection],
    ) -> Result<(), DescriptorError> {
        if global.report_size == 0 || global.report_size > 32 {
            return Err(DescriptorError::ReportSize {
                size: global.report_size,
                offset: item.offset,
            });
        }

        let reports = self.reports_vec_mut(kind);
        let index = match reports.iter().position(|r| r.id == global.report_id) {
            Some(index) => index,
            None => {
                reports.push(Report::new(global.report_id, kind));
                reports.len() - 1
            }
        };
        let report = &mut reports[index];

        let bit_offset = report.size_bits;
        report.size_bits = global
            .report_size
            .checked_mul(global.report_count)
            .and_then(|bits| bits.checked_add(bit_offset))
            .filter(|&bits| bits <= MAX_REPORT_BITS)
            .ok_or(DescriptorError::ReportTooLarge {
                id: global.report_id,
                max_bits: MAX_REPORT_BITS,
                offset: item.offset,
            })?;

        if local.usages.is_empty() {
            // Padding
            return Ok(());
        }

        report.fields.push(Field {
            usage_page: global.usage_page,
            usages: local.usages.clone(),
            flags: item.udata(),
            bit_offset,
            report_size: global.report_size,
            report_count: global.report_count,
            logical_minimum: global.logical_minimum,
            logical_maximum: global.logical_maximum,
            physical_minimum: global.physical_minimum,
            physical_maximum: global.physical_maximum,
            unit: global.unit,
            unit_exponent: global.unit_exponent,
            values: vec![0; global.report_count as usize],
        });

        if let Some(top) = open.first_mut() {
            if !top.report_ids.contains(&global.report_id) {
                top.report_ids.push(global.report_id);
            }
        }
        Ok(())
    }

    fn reports_vec_mut(&mut self, kind: ReportKind) -> &mut Vec<Report> {
        match kind {
            ReportKind::Input => &mut self.input,
            ReportKind::Output => &mut self.output,
            ReportKind::Feature => &mut self.feature,
        }
    }

    /// All reports of one direction
    pub fn reports(&self, kind: ReportKind) -> &[Report] {
        match kind {
            ReportKind::Input => &self.input,
            ReportKind::Output => &self.output,
            ReportKind::Feature => &self.feature,
        }
    }

    /// All reports of one direction, mutable (for filling field values)
    pub fn reports_mut(&mut self, kind: ReportKind) -> &mut [Report] {
        self.reports_vec_mut(kind)
    }

    /// Look up a report by direction and id
    pub fn report(&self, kind: ReportKind, id: u8) -> Option<&Report> {
        self.reports(kind).iter().find(|r| r.id == id)
    }

    /// Top-level application collections
    pub fn applications(&self) -> impl Iterator<Item = &Collection> {
        self.collections
            .iter()
            .filter(|c| c.kind == CollectionKind::Application)
    }
}
