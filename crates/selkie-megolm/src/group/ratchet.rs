//! The Megolm four-part hash ratchet
//!
//! The ratchet holds four 32-byte parts R0..R3 and a 32-bit message
//! counter; part i covers the i-th most significant byte of the counter.
//! Advancing rehashes the parts whose counter byte rolled, always reading
//! the pre-update source part, so a receiver holding an exported state can
//! fast-forward to any later index with at most 1021 hash operations.
//!
//! # Security Properties
//!
//! - Forward secrecy: parts are overwritten by keyed hashes of themselves;
//!   no sequence of outputs recovers an earlier state
//! - Seekability: `advance_to` reproduces exactly the state that repeated
//!   `advance` calls reach
//! - Determinism: the same initial parts produce the same key stream

use std::fmt;

use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::error::MegolmError;

type HmacSha256 = Hmac<Sha256>;

/// Number of ratchet parts.
pub const RATCHET_PARTS: usize = 4;

/// Bytes per ratchet part.
pub const PART_LENGTH: usize = 32;

/// Flat ratchet width: four 32-byte parts.
pub const RATCHET_LENGTH: usize = RATCHET_PARTS * PART_LENGTH;

/// Pickle width: the flat ratchet followed by the big-endian counter.
pub const PICKLE_LENGTH: usize = RATCHET_LENGTH + 4;

/// Randomness consumed by an outbound initialization (parts R2 and R3).
pub const INIT_RANDOM_LENGTH: usize = 2 * PART_LENGTH;

/// Per-part seed byte fed to the rehash HMAC.
const HASH_KEY_SEEDS: [[u8; 1]; RATCHET_PARTS] = [[0x00], [0x01], [0x02], [0x03]];

/// Info string for deriving the first two parts of an outbound ratchet.
const ROOT_INFO: &[u8] = b"MEGOLM_ROOT";

/// HKDF salt for outbound initialization: a single zero byte.
const ROOT_SALT: [u8; 1] = [0x00];

/// A Megolm ratchet: four hash-chained parts plus the message counter.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Ratchet {
    parts: [[u8; PART_LENGTH]; RATCHET_PARTS],
    #[zeroize(skip)]
    counter: u32,
}

impl Ratchet {
    /// Creates an outbound ratchet at counter 0.
    ///
    /// R0 and R1 come from HKDF-SHA256 over the caller's private key
    /// material (salt = one zero byte, info = `MEGOLM_ROOT`); R2 and R3 are
    /// copied directly from the supplied randomness. The 64-derived /
    /// 64-random split is part of the wire contract with peer
    /// implementations and must not be altered.
    pub fn new_outbound(key_material: &[u8], randomness: &[u8; INIT_RANDOM_LENGTH]) -> Ratchet {
        let hkdf = Hkdf::<Sha256>::new(Some(&ROOT_SALT), key_material);
        let mut okm = [0u8; 2 * PART_LENGTH];
        let Ok(()) = hkdf.expand(ROOT_INFO, &mut okm) else {
            unreachable!("64 bytes is a valid HKDF-SHA256 output length");
        };

        let mut parts = [[0u8; PART_LENGTH]; RATCHET_PARTS];
        parts[0].copy_from_slice(&okm[..PART_LENGTH]);
        parts[1].copy_from_slice(&okm[PART_LENGTH..]);
        parts[2].copy_from_slice(&randomness[..PART_LENGTH]);
        parts[3].copy_from_slice(&randomness[PART_LENGTH..]);
        okm.zeroize();

        Ratchet { parts, counter: 0 }
    }

    /// Creates an inbound ratchet from a peer's exported parts and the
    /// counter they were exported at. All four parts are taken verbatim.
    pub fn new_inbound(exported: &[u8; RATCHET_LENGTH], counter: u32) -> Ratchet {
        let mut parts = [[0u8; PART_LENGTH]; RATCHET_PARTS];
        for (i, part) in parts.iter_mut().enumerate() {
            part.copy_from_slice(&exported[i * PART_LENGTH..(i + 1) * PART_LENGTH]);
        }
        Ratchet { parts, counter }
    }

    /// The current message counter.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// The flat 128-byte ratchet state, R0..R3 in order. This is the key
    /// material the message cipher derives from; callers should wipe their
    /// copy after use.
    pub fn key_material(&self) -> [u8; RATCHET_LENGTH] {
        let mut out = [0u8; RATCHET_LENGTH];
        for (i, part) in self.parts.iter().enumerate() {
            out[i * PART_LENGTH..(i + 1) * PART_LENGTH].copy_from_slice(part);
        }
        out
    }

    /// part[to] = HMAC-SHA256(key = part[from], msg = seed byte of `to`).
    ///
    /// The source is read before the destination is written, which keeps
    /// the `from == to` self-rehash and the descending cascades sound.
    fn rehash_part(&mut self, from: usize, to: usize) {
        let Ok(mut mac) = HmacSha256::new_from_slice(&self.parts[from]) else {
            unreachable!("HMAC-SHA256 accepts any key size");
        };
        mac.update(&HASH_KEY_SEEDS[to]);
        let digest = mac.finalize().into_bytes();
        self.parts[to].copy_from_slice(&digest);
    }

    /// Advances the ratchet by one message.
    ///
    /// Finds the most significant counter byte that changed by walking a
    /// shrinking `0x00FFFFFF` mask, then rehashes parts h..=3 from part h,
    /// highest index first so every rehash reads the pre-update part h.
    pub fn advance(&mut self) {
        let mut mask: u32 = 0x00FF_FFFF;
        let mut h = 0;
        self.counter = self.counter.wrapping_add(1);

        while h < RATCHET_PARTS - 1 {
            if self.counter & mask == 0 {
                break;
            }
            h += 1;
            mask >>= 8;
        }

        for k in (h..RATCHET_PARTS).rev() {
            self.rehash_part(h, k);
        }
    }

    /// Advances directly to message index `target`.
    ///
    /// For each part, most significant first: the number of steps is the
    /// byte difference mod 256; when the bytes agree but the target counter
    /// is behind the current one, the counter has lapped and the part needs
    /// a full 256-step cycle. All but the last step rehash the part onto
    /// itself; the last step cascades into every lower part, and the
    /// counter snaps to the target masked at this part's byte boundary.
    pub fn advance_to(&mut self, target: u32) {
        for j in 0..RATCHET_PARTS {
            let shift = 24 - 8 * j as u32;
            let mask: u32 = !0u32 << shift;

            let mut steps = (target >> shift).wrapping_sub(self.counter >> shift) & 0xFF;
            if steps == 0 {
                if target < self.counter {
                    steps = 0x100;
                } else {
                    continue;
                }
            }

            while steps > 1 {
                self.rehash_part(j, j);
                steps -= 1;
            }
            for k in (j..RATCHET_PARTS).rev() {
                self.rehash_part(j, k);
            }
            self.counter = target & mask;
        }
    }

    /// Serializes to the fixed 132-byte pickle: the flat ratchet followed
    /// by the big-endian counter.
    pub fn pickle(&self) -> [u8; PICKLE_LENGTH] {
        let mut out = [0u8; PICKLE_LENGTH];
        out[..RATCHET_LENGTH].copy_from_slice(&self.key_material());
        out[RATCHET_LENGTH..].copy_from_slice(&self.counter.to_be_bytes());
        out
    }

    /// Rebuilds a ratchet from its pickle.
    ///
    /// # Errors
    ///
    /// [`MegolmError::PickleTooShort`] when fewer than 132 bytes remain;
    /// nothing is consumed in that case.
    pub fn unpickle(bytes: &[u8]) -> Result<Ratchet, MegolmError> {
        if bytes.len() < PICKLE_LENGTH {
            return Err(MegolmError::PickleTooShort {
                expected: PICKLE_LENGTH,
                actual: bytes.len(),
            });
        }
        let mut exported = [0u8; RATCHET_LENGTH];
        exported.copy_from_slice(&bytes[..RATCHET_LENGTH]);
        let mut counter_bytes = [0u8; 4];
        counter_bytes.copy_from_slice(&bytes[RATCHET_LENGTH..PICKLE_LENGTH]);
        Ok(Ratchet::new_inbound(&exported, u32::from_be_bytes(counter_bytes)))
    }
}

// The parts are key material; Debug shows only the counter.
impl fmt::Debug for Ratchet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ratchet").field("counter", &self.counter).finish_non_exhaustive()
    }
}
