//! Fuzz target for ProjectivePoint::deserialize
//!
//! This fuzzer feeds arbitrary byte sequences to point decoding to find:
//! - Parser crashes or panics
//! - Off-curve points that bypass validation
//! - Length-handling mistakes
//!
//! The fuzzer should NEVER panic. All invalid inputs must return an error,
//! and anything that decodes must re-encode to the same bytes.

#![no_main]

use libfuzzer_sys::fuzz_target;
use selkie_curve::ProjectivePoint;

fuzz_target!(|data: &[u8]| {
    if let Ok(point) = ProjectivePoint::deserialize(data) {
        // A decoded point is on the curve, and its canonical encoding is
        // stable. The input itself may be non-canonical (ignored top bits,
        // unreduced coordinates), so only the re-encoding must round-trip.
        assert!(point.is_valid());
        let encoded = point.serialize();
        let reparsed = ProjectivePoint::deserialize(&encoded).expect("canonical encoding");
        assert_eq!(reparsed.serialize(), encoded);
    }
});
