// SPDX-License-Identifier: GPL-2.0-or-later
//! Report descriptor correction
//!
//! The M708 V2 advertises a 36-byte descriptor on its digitizer interface
//! that describes none of the pen or keypad data it actually sends. It is
//! replaced wholesale by [`M708_RDESC_FIXED`], which declares the three
//! streams the firmware multiplexes:
//!
//! | id | collection            | payload                                   |
//! |----|-----------------------|-------------------------------------------|
//! | 2  | vendor (0xFF0A)       | 9 bytes in, 9 bytes out                   |
//! | 7  | digitizer / pen       | buttons, X, Y, pressure, X/Y tilt         |
//! | 6  | generic desktop / keypad | pad byte, 8 buttons, 7 pad bytes       |

use tracing::{debug, info};

use crate::classify::report_id;

/// Length of the descriptor the firmware ships
pub const M708_RDESC_ORIG_SIZE: usize = 36;

/// Pen X logical maximum (device units)
pub const PEN_X_MAX: u16 = 50794;
/// Pen Y logical maximum (device units)
pub const PEN_Y_MAX: u16 = 30474;
/// Tip pressure logical maximum
pub const PEN_PRESSURE_MAX: u16 = 8191;
/// Number of keypad buttons
pub const KEYPAD_BUTTONS: usize = 8;

/// Corrected report descriptor, shared read-only by every attached tablet
pub static M708_RDESC_FIXED: [u8; 186] = [
    0x06, 0x0A, 0xFF,       // Usage Page (Vendor Defined 0xFF0A)
    0x09, 0x01,             // Usage (0x01)
    0xA1, 0x01,             // Collection (Application)
    0x85, report_id::VENDOR, //   Report ID (2)
    0x09, 0x02,             //   Usage (0x02)
    0x75, 0x08,             //   Report Size (8)
    0x95, 0x09,             //   Report Count (9)
    0x15, 0x00,             //   Logical Minimum (0)
    0x26, 0xFF, 0x00,       //   Logical Maximum (255)
    0x81, 0x02,             //   Input (Data,Var,Abs)
    0x09, 0x03,             //   Usage (0x03)
    0x75, 0x08,             //   Report Size (8)
    0x95, 0x09,             //   Report Count (9)
    0x15, 0x00,             //   Logical Minimum (0)
    0x26, 0xFF, 0x00,       //   Logical Maximum (255)
    0x91, 0x02,             //   Output (Data,Var,Abs)
    0xC0,                   // End Collection
    0x05, 0x0D,             // Usage Page (Digitizer)
    0x09, 0x02,             // Usage (Pen)
    0xA1, 0x01,             // Collection (Application)
    0x85, report_id::PEN,   //   Report ID (7)
    0x09, 0x20,             //   Usage (Stylus)
    0xA1, 0x00,             //   Collection (Physical)
    0x09, 0x42,             //     Usage (Tip Switch)
    0x09, 0x44,             //     Usage (Barrel Switch)
    0x09, 0x46,             //     Usage (Tablet Pick)
    0x15, 0x00,             //     Logical Minimum (0)
    0x25, 0x01,             //     Logical Maximum (1)
    0x75, 0x01,             //     Report Size (1)
    0x95, 0x03,             //     Report Count (3)
    0x81, 0x02,             //     Input (Data,Var,Abs)
    0x95, 0x02,             //     Report Count (2)
    0x81, 0x03,             //     Input (Const,Var,Abs)
    0x09, 0x32,             //     Usage (In Range)
    0x95, 0x01,             //     Report Count (1)
    0x81, 0x02,             //     Input (Data,Var,Abs)
    0x95, 0x02,             //     Report Count (2)
    0x81, 0x03,             //     Input (Const,Var,Abs)
    0x75, 0x10,             //     Report Size (16)
    0x95, 0x01,             //     Report Count (1)
    0x35, 0x00,             //     Physical Minimum (0)
    0xA4,                   //     Push
    0x05, 0x01,             //       Usage Page (Generic Desktop)
    0x09, 0x30,             //       Usage (X)
    0x65, 0x33,             //       Unit (English Linear: Inch)
    0x55, 0x0D,             //       Unit Exponent (-3)
    0x46, 0x0F, 0x27,       //       Physical Maximum (9999)
    0x26, 0x6A, 0xC6,       //       Logical Maximum (50794)
    0x81, 0x02,             //       Input (Data,Var,Abs)
    0x09, 0x31,             //       Usage (Y)
    0x46, 0x6F, 0x17,       //       Physical Maximum (5999)
    0x26, 0x0A, 0x77,       //       Logical Maximum (30474)
    0x81, 0x02,             //       Input (Data,Var,Abs)
    0xB4,                   //     Pop
    0x09, 0x30,             //     Usage (Tip Pressure)
    0x45, 0x00,             //     Physical Maximum (0)
    0x26, 0xFF, 0x1F,       //     Logical Maximum (8191)
    0x81, 0x42,             //     Input (Data,Var,Abs,Null)
    0x09, 0x3D,             //     Usage (X Tilt)
    0x15, 0x81,             //     Logical Minimum (-127)
    0x25, 0x7F,             //     Logical Maximum (127)
    0x75, 0x08,             //     Report Size (8)
    0x95, 0x01,             //     Report Count (1)
    0x81, 0x02,             //     Input (Data,Var,Abs)
    0x09, 0x3E,             //     Usage (Y Tilt)
    0x15, 0x81,             //     Logical Minimum (-127)
    0x25, 0x7F,             //     Logical Maximum (127)
    0x81, 0x02,             //     Input (Data,Var,Abs)
    0xC0,                   //   End Collection
    0xC0,                   // End Collection
    0x05, 0x01,             // Usage Page (Generic Desktop)
    0x09, 0x07,             // Usage (Keypad)
    0xA1, 0x01,             // Collection (Application)
    0x85, report_id::KEYPAD, //   Report ID (6)
    0x05, 0x0D,             //   Usage Page (Digitizer)
    0x09, 0x39,             //   Usage (Tablet Function Keys)
    0xA0,                   //   Collection (Physical)
    0x75, 0x08,             //     Report Size (8)
    0x95, 0x01,             //     Report Count (1)
    0x81, 0x03,             //     Input (Const,Var,Abs)
    0x05, 0x09,             //     Usage Page (Button)
    0x75, 0x01,             //     Report Size (1)
    0x19, 0x01,             //     Usage Minimum (1)
    0x29, 0x08,             //     Usage Maximum (8)
    0x15, 0x00,             //     Logical Minimum (0)
    0x25, 0x01,             //     Logical Maximum (1)
    0x95, 0x08,             //     Report Count (8)
    0x81, 0x02,             //     Input (Data,Var,Abs)
    0x75, 0x08,             //     Report Size (8)
    0x95, 0x07,             //     Report Count (7)
    0x81, 0x03,             //     Input (Const,Var,Abs)
    0xC0,                   //   End Collection
    0xC0,                   // End Collection
];

/// Replace the firmware's defective descriptor with [`M708_RDESC_FIXED`]
///
/// Only the 36-byte descriptor is known to be broken. Anything else is
/// assumed to be a firmware revision that already describes its reports
/// and is returned as-is.
pub fn report_fixup(rdesc: &[u8]) -> &[u8] {
    if rdesc.len() == M708_RDESC_ORIG_SIZE {
        info!(
            "Replacing {}-byte report descriptor with corrected {}-byte descriptor",
            rdesc.len(),
            M708_RDESC_FIXED.len()
        );
        &M708_RDESC_FIXED
    } else {
        debug!("Keeping {}-byte report descriptor", rdesc.len());
        rdesc
    }
}
