//! Selkie group-messaging cryptography
//!
//! The Megolm layer of the Selkie protocol: a four-part hash ratchet that
//! produces one symmetric key per group message, a per-message AEAD-style
//! cipher over that key stream, and session objects binding both to a wire
//! format. Pure functions with deterministic outputs; callers provide the
//! shared secret and random bytes, which keeps every test reproducible.
//!
//! # Key Lifecycle
//!
//! A sender derives a ratchet from a key-exchange output plus fresh
//! randomness and shares an export of it (over an already-secure channel)
//! with the group. Each message advances the sender's ratchet; receivers
//! seek their copy forward to the message index. A receiver's export point
//! is a hard floor: earlier indices are out of reach of its state.
//!
//! # Security
//!
//! Forward Secrecy:
//! - Ratchet advancement overwrites parts with keyed hashes of themselves
//! - Receivers joining at index i can never read indices below i
//!
//! Authenticity:
//! - Truncated HMAC-SHA3 tag over the message metadata and plaintext
//! - Failed authentication -> reject message, wipe recovered plaintext
//!
//! Interoperability caution: the key schedule reproduces two deliberate
//! quirks of the peer wire format (shared AES/MAC key, session-id-derived
//! IV bytes). They are load-bearing for compatibility; see DESIGN.md.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod group;

pub use group::{
    INIT_RANDOM_LENGTH, InboundGroupSession, MAC_LENGTH, MESSAGE_VERSION, MIN_SESSION_ID_LENGTH,
    MegolmError, MessageInfo, OutboundGroupSession, PICKLE_LENGTH, RATCHET_LENGTH, Ratchet,
    decode_message_info, encode_message_info,
};
