//! Fuzz target for group-message decoding
//!
//! Runs arbitrary bytes through the metadata decoder and a full inbound
//! session decrypt. Neither may panic; undecodable or unauthenticated
//! input must surface as an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use selkie_megolm::{InboundGroupSession, decode_message_info};

fuzz_target!(|data: &[u8]| {
    let _ = decode_message_info(data);

    let session_id = [0x5Au8; 32];
    let export = [0u8; 132];
    let mut session =
        InboundGroupSession::new(&session_id, &export).expect("fixed export is valid");
    // Arbitrary bytes were never produced by this session's sender; they
    // must never decrypt.
    assert!(session.decrypt(data).is_err());
});
