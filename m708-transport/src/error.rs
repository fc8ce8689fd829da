// SPDX-License-Identifier: GPL-2.0-or-later
//! Transport error types

use thiserror::Error;

/// Errors that can occur during transport operations
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device disconnected")]
    Disconnected,

    #[error("Short write: sent {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    // HID-specific errors
    #[error("HID error: {0}")]
    HidError(String),

    #[error("HID permission denied: {0}")]
    HidPermissionDenied(String),

    // uhid and other OS-level I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport not started")]
    NotStarted,
}

impl From<hidapi::HidError> for TransportError {
    fn from(e: hidapi::HidError) -> Self {
        let msg = e.to_string();
        if msg.contains("Permission denied") || msg.contains("EPERM") {
            TransportError::HidPermissionDenied(msg)
        } else {
            TransportError::HidError(msg)
        }
    }
}

/// Errors produced while reading a report descriptor into a report layout
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("Truncated item at offset {offset}")]
    Truncated { offset: usize },

    #[error("Long items are not supported (offset {offset})")]
    LongItem { offset: usize },

    #[error("End Collection without open collection at offset {offset}")]
    UnbalancedCollection { offset: usize },

    #[error("Pop without matching Push at offset {offset}")]
    UnbalancedPop { offset: usize },

    #[error("{open} collection(s) left open at end of descriptor")]
    UnclosedCollection { open: usize },

    #[error("Unsupported report size {size} at offset {offset}")]
    ReportSize { size: u32, offset: usize },

    #[error("Report {id} exceeds {max_bits} bits at offset {offset}")]
    ReportTooLarge { id: u8, max_bits: u32, offset: usize },

    #[error("Descriptor is empty")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_is_classified() {
        let err: TransportError = hidapi::HidError::HidApiError {
            message: "open failed: Permission denied".into(),
        }
        .into();
        assert!(matches!(err, TransportError::HidPermissionDenied(_)));
    }

    #[test]
    fn test_other_hid_errors_are_generic() {
        let err: TransportError = hidapi::HidError::HidApiError {
            message: "read timed out".into(),
        }
        .into();
        assert!(matches!(err, TransportError::HidError(_)));
    }
}
