//! Outbound and inbound group sessions
//!
//! A session binds a ratchet to a session id and the wire framing. The
//! sender owns an outbound session that assigns consecutive message
//! indices; receivers hold inbound sessions created from an exported
//! ratchet state and seek to each message's index without ever rewinding
//! below the export point.
//!
//! Wire layout of one message:
//!
//! ```text
//! [version | 0x08 varint(index) | 0x12 varint(ciphertext len)]
//! [ciphertext (AES-256-CBC, PKCS#7)]
//! [8-byte truncated tag]
//! ```

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::cipher;
use super::cipher::MAC_LENGTH;
use super::error::MegolmError;
use super::message::{decode_message_info, encode_message_info};
use super::ratchet::{INIT_RANDOM_LENGTH, PICKLE_LENGTH, Ratchet};

/// Protocol version carried in every group message.
pub const MESSAGE_VERSION: u8 = 0x03;

/// The sending half of a group session.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct OutboundGroupSession {
    ratchet: Ratchet,
    session_id: Vec<u8>,
}

impl OutboundGroupSession {
    /// Creates an outbound session.
    ///
    /// The ratchet's first two parts derive from `key_material`, the rest
    /// from `randomness`; see [`Ratchet::new_outbound`].
    ///
    /// # Errors
    ///
    /// [`MegolmError::SessionIdTooShort`] when the session id is below the
    /// cipher's digest width.
    pub fn new(
        session_id: &[u8],
        key_material: &[u8],
        randomness: &[u8; INIT_RANDOM_LENGTH],
    ) -> Result<OutboundGroupSession, MegolmError> {
        if session_id.len() < cipher::MIN_SESSION_ID_LENGTH {
            return Err(MegolmError::SessionIdTooShort {
                minimum: cipher::MIN_SESSION_ID_LENGTH,
                actual: session_id.len(),
            });
        }
        Ok(OutboundGroupSession {
            ratchet: Ratchet::new_outbound(key_material, randomness),
            session_id: session_id.to_vec(),
        })
    }

    /// The index the next message will carry.
    pub fn next_index(&self) -> u32 {
        self.ratchet.counter()
    }

    /// Encrypts `plaintext` as the next message and advances the ratchet.
    pub fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, MegolmError> {
        let index = self.ratchet.counter();
        let mut key_material = self.ratchet.key_material();
        let body =
            cipher::encrypt(&key_material, &self.session_id, MESSAGE_VERSION, index, plaintext);
        key_material.zeroize();
        let body = body?;

        let ciphertext_len = body.len() - MAC_LENGTH;
        let mut out = encode_message_info(MESSAGE_VERSION, index, ciphertext_len);
        out.extend_from_slice(&body);

        self.ratchet.advance();
        Ok(out)
    }

    /// Exports the current ratchet state (parts plus counter) for sharing
    /// with a receiver. A receiver holding this export decrypts every
    /// message from the current index onward, and nothing earlier.
    pub fn export(&self) -> [u8; PICKLE_LENGTH] {
        self.ratchet.pickle()
    }
}

/// The receiving half of a group session.
///
/// Holds the earliest ratchet state it was given plus the most advanced
/// state it has derived, so in-order traffic never replays hash work and
/// out-of-order traffic within the window stays decryptable.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct InboundGroupSession {
    initial: Ratchet,
    latest: Ratchet,
    session_id: Vec<u8>,
}

impl InboundGroupSession {
    /// Creates an inbound session from an outbound session's export.
    ///
    /// # Errors
    ///
    /// - [`MegolmError::SessionIdTooShort`] for a session id below the
    ///   cipher's digest width
    /// - [`MegolmError::PickleTooShort`] for a truncated export
    pub fn new(session_id: &[u8], export: &[u8]) -> Result<InboundGroupSession, MegolmError> {
        if session_id.len() < cipher::MIN_SESSION_ID_LENGTH {
            return Err(MegolmError::SessionIdTooShort {
                minimum: cipher::MIN_SESSION_ID_LENGTH,
                actual: session_id.len(),
            });
        }
        let initial = Ratchet::unpickle(export)?;
        let latest = initial.clone();
        Ok(InboundGroupSession { initial, latest, session_id: session_id.to_vec() })
    }

    /// Earliest message index this session can derive keys for.
    pub fn first_known_index(&self) -> u32 {
        self.initial.counter()
    }

    /// Decrypts a wire message, returning the plaintext and its index.
    ///
    /// Seeks the ratchet forward to the message index; an index below the
    /// export point fails with [`MegolmError::RatchetRewind`] since the
    /// ratchet cannot run backwards.
    ///
    /// # Errors
    ///
    /// Structural failures surface as
    /// [`BadMessageFormat`](MegolmError::BadMessageFormat); cryptographic
    /// failures keep the cipher's distinct codes.
    pub fn decrypt(&mut self, message: &[u8]) -> Result<(Vec<u8>, u32), MegolmError> {
        let (info, header_len) = decode_message_info(message)?;
        if info.version != MESSAGE_VERSION {
            return Err(MegolmError::BadMessageFormat {
                reason: format!("unsupported version {}", info.version),
            });
        }
        let body = &message[header_len..];
        if body.len() < MAC_LENGTH || body.len() - MAC_LENGTH != info.length {
            return Err(MegolmError::BadMessageFormat {
                reason: "ciphertext length field mismatch".to_string(),
            });
        }

        let ratchet = self.ratchet_at(info.index)?;
        let mut key_material = ratchet.key_material();
        let plaintext =
            cipher::decrypt(&key_material, &self.session_id, info.version, info.index, body);
        key_material.zeroize();

        Ok((plaintext?, info.index))
    }

    /// The ratchet state at `index`, advancing a copy of whichever held
    /// state is closest from below. Successful seeks past the latest state
    /// become the new latest.
    fn ratchet_at(&mut self, index: u32) -> Result<Ratchet, MegolmError> {
        if index < self.initial.counter() {
            return Err(MegolmError::RatchetRewind {
                earliest: self.initial.counter(),
                requested: index,
            });
        }

        if index >= self.latest.counter() {
            if index > self.latest.counter() {
                self.latest.advance_to(index);
            }
            return Ok(self.latest.clone());
        }

        let mut ratchet = self.initial.clone();
        if index > ratchet.counter() {
            ratchet.advance_to(index);
        }
        Ok(ratchet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SESSION_ID: &[u8; 32] = b"selkie-session-identifier-32byte";

    fn outbound() -> OutboundGroupSession {
        let randomness = [0x42u8; INIT_RANDOM_LENGTH];
        OutboundGroupSession::new(SESSION_ID, b"shared-secret-material", &randomness).unwrap()
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let mut sender = outbound();
        let mut receiver = InboundGroupSession::new(SESSION_ID, &sender.export()).unwrap();

        let message = sender.encrypt(b"hello group").unwrap();
        let (plaintext, index) = receiver.decrypt(&message).unwrap();
        assert_eq!(plaintext, b"hello group");
        assert_eq!(index, 0);
    }

    #[test]
    fn indices_increase_per_message() {
        let mut sender = outbound();
        assert_eq!(sender.next_index(), 0);
        sender.encrypt(b"one").unwrap();
        assert_eq!(sender.next_index(), 1);
        sender.encrypt(b"two").unwrap();
        assert_eq!(sender.next_index(), 2);
    }

    #[test]
    fn out_of_order_messages_decrypt_within_the_window() {
        let mut sender = outbound();
        let mut receiver = InboundGroupSession::new(SESSION_ID, &sender.export()).unwrap();

        let first = sender.encrypt(b"first").unwrap();
        let second = sender.encrypt(b"second").unwrap();
        let third = sender.encrypt(b"third").unwrap();

        let (plaintext, index) = receiver.decrypt(&third).unwrap();
        assert_eq!((plaintext.as_slice(), index), (b"third".as_slice(), 2));
        let (plaintext, index) = receiver.decrypt(&first).unwrap();
        assert_eq!((plaintext.as_slice(), index), (b"first".as_slice(), 0));
        let (plaintext, index) = receiver.decrypt(&second).unwrap();
        assert_eq!((plaintext.as_slice(), index), (b"second".as_slice(), 1));
    }

    #[test]
    fn late_join_cannot_read_earlier_messages() {
        let mut sender = outbound();
        let early = sender.encrypt(b"before join").unwrap();

        // The receiver joins at index 1.
        let mut receiver = InboundGroupSession::new(SESSION_ID, &sender.export()).unwrap();
        assert_eq!(receiver.first_known_index(), 1);

        let result = receiver.decrypt(&early);
        assert_eq!(
            result,
            Err(MegolmError::RatchetRewind { earliest: 1, requested: 0 })
        );

        let current = sender.encrypt(b"after join").unwrap();
        assert_eq!(receiver.decrypt(&current).unwrap().0, b"after join");
    }

    #[test]
    fn tampered_message_fails() {
        let mut sender = outbound();
        let mut receiver = InboundGroupSession::new(SESSION_ID, &sender.export()).unwrap();

        let mut message = sender.encrypt(b"payload").unwrap();
        let last = message.len() - 1;
        message[last] ^= 1;
        assert_eq!(receiver.decrypt(&message), Err(MegolmError::BadMac));
    }

    #[test]
    fn truncated_message_fails_structurally() {
        let mut sender = outbound();
        let mut receiver = InboundGroupSession::new(SESSION_ID, &sender.export()).unwrap();

        let message = sender.encrypt(b"payload").unwrap();
        let result = receiver.decrypt(&message[..message.len() - 1]);
        assert!(matches!(result, Err(MegolmError::BadMessageFormat { .. })));
    }

    #[test]
    fn wrong_session_id_fails_authentication() {
        let mut sender = outbound();
        let other_id: &[u8; 32] = b"another-session-identifier-32byt";
        let mut receiver = InboundGroupSession::new(other_id, &sender.export()).unwrap();

        let message = sender.encrypt(b"payload").unwrap();
        let result = receiver.decrypt(&message);
        assert!(matches!(
            result,
            Err(MegolmError::BadMac | MegolmError::BadPadding)
        ));
    }

    #[test]
    fn sessions_reject_short_session_ids() {
        let randomness = [0u8; INIT_RANDOM_LENGTH];
        assert!(matches!(
            OutboundGroupSession::new(b"short", b"key", &randomness),
            Err(MegolmError::SessionIdTooShort { .. })
        ));
        assert!(matches!(
            InboundGroupSession::new(b"short", &[0u8; PICKLE_LENGTH]),
            Err(MegolmError::SessionIdTooShort { .. })
        ));
    }

    #[test]
    fn inbound_rejects_truncated_export() {
        assert!(matches!(
            InboundGroupSession::new(SESSION_ID, &[0u8; PICKLE_LENGTH - 1]),
            Err(MegolmError::PickleTooShort { .. })
        ));
    }

    #[test]
    fn export_import_preserves_the_stream() {
        let mut sender = outbound();
        sender.encrypt(b"zero").unwrap();
        sender.encrypt(b"one").unwrap();

        // A receiver created from a mid-stream export reads index 2 onward.
        let mut receiver = InboundGroupSession::new(SESSION_ID, &sender.export()).unwrap();
        let message = sender.encrypt(b"two").unwrap();
        let (plaintext, index) = receiver.decrypt(&message).unwrap();
        assert_eq!(plaintext, b"two");
        assert_eq!(index, 2);
    }
}
