// SPDX-License-Identifier: GPL-2.0-or-later
//! Input report reclassification
//!
//! The tablet sends pen, keypad and vendor packets on one endpoint and does
//! not label them consistently. The first payload byte tells them apart:
//!
//! - `0xB1`: vendor/control packet, id left as sent
//! - `0xF0`: keypad packet, relabelled as report 6
//! - anything else: pen packet, relabelled as report 7

use m708_transport::ReportKind;
use serde::Serialize;

/// Report ids declared by the corrected descriptor
pub mod report_id {
    /// Vendor control stream (9 bytes each way)
    pub const VENDOR: u8 = 0x02;
    /// Keypad stream
    pub const KEYPAD: u8 = 0x06;
    /// Pen stream
    pub const PEN: u8 = 0x07;
}

/// First payload byte values with a fixed meaning
pub mod discriminator {
    /// Control packet; forwarded unchanged
    pub const CONTROL: u8 = 0xB1;
    /// Keypad packet
    pub const KEYPAD: u8 = 0xF0;
}

/// Logical stream a report id belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    Vendor,
    Keypad,
    Pen,
}

impl Stream {
    pub fn from_report_id(id: u8) -> Option<Self> {
        match id {
            report_id::VENDOR => Some(Self::Vendor),
            report_id::KEYPAD => Some(Self::Keypad),
            report_id::PEN => Some(Self::Pen),
            _ => None,
        }
    }

    pub fn report_id(self) -> u8 {
        match self {
            Self::Vendor => report_id::VENDOR,
            Self::Keypad => report_id::KEYPAD,
            Self::Pen => report_id::PEN,
        }
    }
}

/// Rewrite the report id of a raw input packet in place
///
/// Non-input reports are never touched. A packet too short to carry a
/// discriminator is left as received.
pub fn classify_raw_event(data: &mut [u8], kind: ReportKind) {
    if kind != ReportKind::Input {
        return;
    }

    let Some(&tag) = data.get(1) else {
        return;
    };

    match tag {
        discriminator::CONTROL => {}
        discriminator::KEYPAD => data[0] = report_id::KEYPAD,
        _ => data[0] = report_id::PEN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypad_packet() {
        let mut data = [0x02, 0xF0, 0x00, 0x01, 0, 0, 0, 0, 0, 0];
        classify_raw_event(&mut data, ReportKind::Input);
        assert_eq!(data[0], report_id::KEYPAD);
        assert_eq!(&data[1..], &[0xF0, 0x00, 0x01, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_pen_packet() {
        let mut data = [0x02, 0x05, 0x10, 0x27, 0x20, 0x4E, 0xFF, 0x0F, 0x00, 0x00];
        classify_raw_event(&mut data, ReportKind::Input);
        assert_eq!(data[0], report_id::PEN);
    }

    #[test]
    fn test_control_packet_keeps_id() {
        let mut data = [0x02, 0xB1, 0x01, 0x02];
        classify_raw_event(&mut data, ReportKind::Input);
        assert_eq!(data, [0x02, 0xB1, 0x01, 0x02]);

        let mut data = [0x09, 0xB1];
        classify_raw_event(&mut data, ReportKind::Input);
        assert_eq!(data[0], 0x09);
    }

    #[test]
    fn test_non_input_untouched() {
        for kind in [ReportKind::Output, ReportKind::Feature] {
            let mut data = [0x02, 0xF0, 0x00];
            classify_raw_event(&mut data, kind);
            assert_eq!(data, [0x02, 0xF0, 0x00]);
        }
    }

    #[test]
    fn test_short_packets_untouched() {
        let mut empty: [u8; 0] = [];
        classify_raw_event(&mut empty, ReportKind::Input);

        let mut one = [0x02];
        classify_raw_event(&mut one, ReportKind::Input);
        assert_eq!(one, [0x02]);
    }

    #[test]
    fn test_stream_ids() {
        for stream in [Stream::Vendor, Stream::Keypad, Stream::Pen] {
            assert_eq!(Stream::from_report_id(stream.report_id()), Some(stream));
        }
        assert_eq!(Stream::from_report_id(0x01), None);
    }
}
