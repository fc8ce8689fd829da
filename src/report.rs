// SPDX-License-Identifier: GPL-2.0-or-later
//! Typed views of classified input reports
//!
//! Layouts mirror the corrected descriptor in [`crate::rdesc`]; every
//! stream is 10 bytes including the report id.

use std::fmt;

use serde::Serialize;
use zerocopy::little_endian::U16;
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

use crate::classify::Stream;
use crate::rdesc::KEYPAD_BUTTONS;

/// Pen button bits (byte 1 of a pen report)
pub mod pen_bits {
    pub const TIP: u8 = 1 << 0;
    pub const BARREL: u8 = 1 << 1;
    pub const SECONDARY: u8 = 1 << 2;
    pub const IN_RANGE: u8 = 1 << 5;
}

/// Pen report (id 7)
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct PenReport {
    pub report_id: u8,
    pub buttons: u8,
    pub x: U16,
    pub y: U16,
    pub pressure: U16,
    pub tilt_x: i8,
    pub tilt_y: i8,
}

impl PenReport {
    pub fn tip(&self) -> bool {
        self.buttons & pen_bits::TIP != 0
    }

    pub fn barrel(&self) -> bool {
        self.buttons & pen_bits::BARREL != 0
    }

    pub fn secondary(&self) -> bool {
        self.buttons & pen_bits::SECONDARY != 0
    }

    pub fn in_range(&self) -> bool {
        self.buttons & pen_bits::IN_RANGE != 0
    }
}

/// Keypad report (id 6)
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct KeypadReport {
    pub report_id: u8,
    /// Carries the 0xF0 discriminator; constant in the descriptor
    _marker: u8,
    /// Bit n set = button n+1 held
    pub buttons: u8,
    _pad: [u8; 7],
}

impl KeypadReport {
    /// 1-based numbers of the buttons currently held
    pub fn pressed(&self) -> Vec<u8> {
        (0..KEYPAD_BUTTONS as u8)
            .filter(|b| self.buttons & (1 << b) != 0)
            .map(|b| b + 1)
            .collect()
    }
}

/// A decoded, classified input report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stream", rename_all = "lowercase")]
pub enum TabletEvent {
    Pen {
        tip: bool,
        barrel: bool,
        secondary: bool,
        in_range: bool,
        x: u16,
        y: u16,
        pressure: u16,
        tilt_x: i8,
        tilt_y: i8,
    },
    Keypad {
        buttons: Vec<u8>,
    },
    Vendor {
        payload: Vec<u8>,
    },
    Unknown {
        report_id: u8,
        data: Vec<u8>,
    },
}

impl TabletEvent {
    /// Decode a report that already went through classification
    pub fn decode(data: &[u8]) -> Self {
        let unknown = || TabletEvent::Unknown {
            report_id: data.first().copied().unwrap_or(0),
            data: data.to_vec(),
        };

        match data.first().copied().and_then(Stream::from_report_id) {
            Some(Stream::Pen) => match PenReport::read_from_prefix(data) {
                Ok((pen, _)) => TabletEvent::Pen {
                    tip: pen.tip(),
                    barrel: pen.barrel(),
                    secondary: pen.secondary(),
                    in_range: pen.in_range(),
                    x: pen.x.get(),
                    y: pen.y.get(),
                    pressure: pen.pressure.get(),
                    tilt_x: pen.tilt_x,
                    tilt_y: pen.tilt_y,
                },
                Err(_) => unknown(),
            },
            Some(Stream::Keypad) => match KeypadReport::read_from_prefix(data) {
                Ok((keypad, _)) => TabletEvent::Keypad {
                    buttons: keypad.pressed(),
                },
                Err(_) => unknown(),
            },
            Some(Stream::Vendor) => TabletEvent::Vendor {
                payload: data[1..].to_vec(),
            },
            None => unknown(),
        }
    }

    pub fn stream(&self) -> Option<Stream> {
        match self {
            TabletEvent::Pen { .. } => Some(Stream::Pen),
            TabletEvent::Keypad { .. } => Some(Stream::Keypad),
            TabletEvent::Vendor { .. } => Some(Stream::Vendor),
            TabletEvent::Unknown { report_id, .. } => Stream::from_report_id(*report_id),
        }
    }
}

impl fmt::Display for TabletEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabletEvent::Pen {
                tip,
                barrel,
                secondary,
                in_range,
                x,
                y,
                pressure,
                tilt_x,
                tilt_y,
            } => {
                let flag = |on: bool, c: char| if on { c } else { '-' };
                write!(
                    f,
                    "pen    [{}{}{}{}] x={:5} y={:5} p={:4} tilt=({:4},{:4})",
                    flag(*in_range, 'R'),
                    flag(*tip, 'T'),
                    flag(*barrel, 'B'),
                    flag(*secondary, 'S'),
                    x,
                    y,
                    pressure,
                    tilt_x,
                    tilt_y
                )
            }
            TabletEvent::Keypad { buttons } if buttons.is_empty() => write!(f, "keypad released"),
            TabletEvent::Keypad { buttons } => write!(f, "keypad {buttons:?}"),
            TabletEvent::Vendor { payload } => write!(f, "vendor {payload:02X?}"),
            TabletEvent::Unknown { report_id, data } => {
                write!(f, "report 0x{report_id:02X} {data:02X?}")
            }
        }
    }
}

/// Wire length of a report on `stream`, report id included
pub fn expected_len(stream: Stream) -> usize {
    match stream {
        Stream::Pen => std::mem::size_of::<PenReport>(),
        Stream::Keypad => std::mem::size_of::<KeypadReport>(),
        Stream::Vendor => 1 + 9,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::report_id;

    #[test]
    fn test_layout_sizes() {
        assert_eq!(std::mem::size_of::<PenReport>(), 10);
        assert_eq!(std::mem::size_of::<KeypadReport>(), 10);
        assert_eq!(expected_len(Stream::Vendor), 10);
    }

    #[test]
    fn test_decode_pen() {
        let data = [
            report_id::PEN,
            pen_bits::IN_RANGE | pen_bits::TIP | pen_bits::BARREL,
            0x6A,
            0xC6, // x = 50794
            0x0A,
            0x77, // y = 30474
            0xFF,
            0x1F, // pressure = 8191
            0x81, // -127
            0x7F, // 127
        ];
        assert_eq!(
            TabletEvent::decode(&data),
            TabletEvent::Pen {
                tip: true,
                barrel: true,
                secondary: false,
                in_range: true,
                x: 50794,
                y: 30474,
                pressure: 8191,
                tilt_x: -127,
                tilt_y: 127,
            }
        );
    }

    #[test]
    fn test_decode_keypad() {
        let data = [report_id::KEYPAD, 0xF0, 0b1000_0101, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            TabletEvent::decode(&data),
            TabletEvent::Keypad {
                buttons: vec![1, 3, 8]
            }
        );
    }

    #[test]
    fn test_decode_short_pen_is_unknown() {
        let data = [report_id::PEN, 0x20, 0x00];
        let event = TabletEvent::decode(&data);
        assert!(matches!(event, TabletEvent::Unknown { report_id: 7, .. }));
        assert_eq!(event.stream(), Some(Stream::Pen));
    }

    #[test]
    fn test_decode_vendor() {
        let data = [report_id::VENDOR, 0xB1, 0x01];
        assert_eq!(
            TabletEvent::decode(&data),
            TabletEvent::Vendor {
                payload: vec![0xB1, 0x01]
            }
        );
    }

    #[test]
    fn test_json_shape() {
        let event = TabletEvent::Keypad { buttons: vec![2] };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"stream":"keypad","buttons":[2]}"#);
    }
}
