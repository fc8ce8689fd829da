// SPDX-License-Identifier: GPL-2.0-or-later
//! Property-based tests for descriptor fixup and report classification.

use m708_driver::classify::discriminator;
use m708_driver::{
    classify_raw_event, report_fixup, report_id, TabletEvent, M708_RDESC_FIXED,
    M708_RDESC_ORIG_SIZE,
};
use m708_transport::ReportKind;
use proptest::prelude::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(500))]

    // -- Descriptor fixup -----------------------------------------------------

    /// Any 36-byte descriptor is replaced, whatever its contents.
    #[test]
    fn prop_defective_length_always_replaced(rdesc in prop::collection::vec(any::<u8>(), M708_RDESC_ORIG_SIZE)) {
        prop_assert_eq!(report_fixup(&rdesc), &M708_RDESC_FIXED[..]);
    }

    /// Every other length comes back untouched.
    #[test]
    fn prop_other_lengths_identity(rdesc in prop::collection::vec(any::<u8>(), 0..512)) {
        prop_assume!(rdesc.len() != M708_RDESC_ORIG_SIZE);
        prop_assert_eq!(report_fixup(&rdesc), &rdesc[..]);
    }

    // -- Classification -------------------------------------------------------

    /// Only byte 0 of an input report may change, and only to 6 or 7.
    #[test]
    fn prop_input_classification(data in prop::collection::vec(any::<u8>(), 2..64)) {
        let mut classified = data.clone();
        classify_raw_event(&mut classified, ReportKind::Input);

        prop_assert_eq!(&classified[1..], &data[1..]);
        let expected = match data[1] {
            discriminator::CONTROL => data[0],
            discriminator::KEYPAD => report_id::KEYPAD,
            _ => report_id::PEN,
        };
        prop_assert_eq!(classified[0], expected);
    }

    /// Output and feature reports are never modified.
    #[test]
    fn prop_non_input_untouched(data in prop::collection::vec(any::<u8>(), 0..64), feature: bool) {
        let kind = if feature { ReportKind::Feature } else { ReportKind::Output };
        let mut classified = data.clone();
        classify_raw_event(&mut classified, kind);
        prop_assert_eq!(classified, data);
    }

    /// Classifying twice gives the same result as once.
    #[test]
    fn prop_classification_idempotent(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut once = data.clone();
        classify_raw_event(&mut once, ReportKind::Input);
        let mut twice = once.clone();
        classify_raw_event(&mut twice, ReportKind::Input);
        prop_assert_eq!(once, twice);
    }

    /// Decoding never panics, whatever the report.
    #[test]
    fn prop_decode_total(data in prop::collection::vec(any::<u8>(), 0..32)) {
        let _ = TabletEvent::decode(&data);
    }
}
