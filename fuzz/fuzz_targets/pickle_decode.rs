//! Fuzz target for Ratchet::unpickle
//!
//! Arbitrary bytes must either fail cleanly or produce a ratchet whose
//! pickle reproduces the consumed prefix byte for byte.

#![no_main]

use libfuzzer_sys::fuzz_target;
use selkie_megolm::{PICKLE_LENGTH, Ratchet};

fuzz_target!(|data: &[u8]| {
    match Ratchet::unpickle(data) {
        Ok(ratchet) => {
            assert!(data.len() >= PICKLE_LENGTH);
            assert_eq!(ratchet.pickle().as_slice(), &data[..PICKLE_LENGTH]);
        }
        Err(_) => assert!(data.len() < PICKLE_LENGTH),
    }
});
