// SPDX-License-Identifier: GPL-2.0-or-later
//! Device registry - identification of supported tablets
//!
//! All USB identification constants live here. The tablet is a composite
//! device; only the interface carrying the digitizer and keypad function
//! is driven, the others are left to whichever driver claims them.

use tracing::info;

/// UGEE vendor ID
pub const VENDOR_ID: u16 = 0x28BD;

/// UGEE M708 V2 product ID
pub const PRODUCT_ID_M708_V2: u16 = 0x0936;

/// All known (VID, PID) pairs served by this driver
pub const SUPPORTED_DEVICES: &[(u16, u16)] = &[(VENDOR_ID, PRODUCT_ID_M708_V2)];

/// USB interface number of the digitizer/keypad function
pub const INTERFACE_DIGITIZER: i32 = 2;

/// Check if a VID/PID pair is a supported tablet
#[inline]
pub fn is_supported(vid: u16, pid: u16) -> bool {
    SUPPORTED_DEVICES.contains(&(vid, pid))
}

/// Interface gate: accept only the digitizer/keypad interface
///
/// Runs before the report descriptor is looked at. Rejection is not an
/// error for the device as a whole.
pub fn accept_interface(interface_number: i32) -> bool {
    if interface_number != INTERFACE_DIGITIZER {
        info!("interface {} is not the digitizer, ignoring", interface_number);
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_digitizer_interface_accepted() {
        assert!(accept_interface(INTERFACE_DIGITIZER));
        for other in [-1, 0, 1, 3, 4, 255] {
            assert!(!accept_interface(other), "interface {other} accepted");
        }
    }

    #[test]
    fn test_supported_devices() {
        assert!(is_supported(VENDOR_ID, PRODUCT_ID_M708_V2));
        assert!(!is_supported(VENDOR_ID, 0x0000));
        assert!(!is_supported(0x3151, PRODUCT_ID_M708_V2));
    }
}
