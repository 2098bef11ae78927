//! Megolm: multi-part symmetric ratchet for group messaging
//!
//! ```text
//! shared secret + randomness
//!        │
//!        ▼ HKDF ("MEGOLM_ROOT")
//! Ratchet (R0..R3, counter)
//!        │
//!        ▼ advance / advance_to
//! per-index ratchet state
//!        │
//!        ▼ HKDF ("MEGOLM_KEYS") → AES-256-CBC + truncated HMAC-SHA3
//! group message
//! ```
//!
//! # Architecture
//!
//! - [`ratchet`]: the four-part hash ratchet, seeking, and pickling
//! - [`cipher`]: the per-message key schedule, encryption, and the tag
//! - [`message`]: the authenticated metadata / wire header codec
//! - [`session`]: outbound/inbound session objects tying the above to the
//!   wire format
//!
//! # Security Properties
//!
//! - Forward secrecy: ratchet states only wind forward; receivers cannot
//!   derive keys for indices before their export point
//! - Authenticity: every message carries a truncated MAC over its
//!   metadata and plaintext, compared in constant time
//! - Determinism: all key material derives from caller-supplied secrets
//!   and randomness; nothing is fetched internally

pub mod cipher;
pub mod error;
pub mod message;
pub mod ratchet;
pub mod session;

pub use cipher::{MAC_LENGTH, MIN_SESSION_ID_LENGTH};
pub use error::MegolmError;
pub use message::{MessageInfo, decode_message_info, encode_message_info};
pub use ratchet::{INIT_RANDOM_LENGTH, PICKLE_LENGTH, RATCHET_LENGTH, Ratchet};
pub use session::{InboundGroupSession, MESSAGE_VERSION, OutboundGroupSession};
