//! Dual-EC-style deterministic random bit generator
//!
//! The generator walks a 32-byte state with scalar multiplications against
//! two fixed curve points: the base point P updates the state, the second
//! point Q produces output. Entropy is injected by the caller at creation
//! and reseed time; the generator itself never performs I/O.
//!
//! # Security
//!
//! - Determinism: identical seed material yields identical output streams
//! - Reseed discipline: after 2^32 output blocks, sampling fails with a
//!   distinguished code until fresh entropy arrives
//! - State hygiene: the internal state is wiped on drop and replaced
//!   wholesale on reseed

use sha3::{Digest, Sha3_256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::DrbgError;
use crate::wei25519::constants::{DRBG_Q, GENERATOR};
use crate::wei25519::scalar::Scalar;

/// Security level in bytes (128-bit).
pub const SECURITY_LEVEL_BYTES: usize = 16;

/// Minimum entropy for generator creation: twice the security level.
pub const MIN_INIT_ENTROPY: usize = 2 * SECURITY_LEVEL_BYTES;

/// Minimum fresh entropy for a reseed.
pub const MIN_RESEED_ENTROPY: usize = SECURITY_LEVEL_BYTES;

/// Cap on each of entropy, nonce, and additional input.
pub const MAX_SEED_INPUT: usize = 1024;

/// Bytes produced per internal block: the Q-multiple's x coordinate with
/// its three high-order bytes dropped.
pub const BLOCK_SIZE: usize = 29;

/// Output blocks allowed between reseeds.
pub const RESEED_INTERVAL: u64 = 1 << 32;

/// Domain-separation prefix for initial seeding.
const SEED_DOMAIN: &[u8] = b"selkie-drbg-seed";

/// Domain-separation prefix for reseeding.
const RESEED_DOMAIN: &[u8] = b"selkie-drbg-reseed";

/// A deterministic random bit generator over Wei25519.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Drbg {
    state: [u8; 32],
    #[zeroize(skip)]
    blocks: u64,
}

impl Drbg {
    /// Creates a generator from caller-supplied entropy, a nonce, and
    /// optional additional input (pass an empty slice for none).
    ///
    /// # Errors
    ///
    /// - [`DrbgError::EntropyTooShort`] below 2x the security level
    /// - [`DrbgError::InputTooLong`] for any input beyond 1024 bytes
    pub fn new(entropy: &[u8], nonce: &[u8], additional: &[u8]) -> Result<Drbg, DrbgError> {
        if entropy.len() < MIN_INIT_ENTROPY {
            return Err(DrbgError::EntropyTooShort {
                minimum: MIN_INIT_ENTROPY,
                actual: entropy.len(),
            });
        }
        for input in [entropy, nonce, additional] {
            if input.len() > MAX_SEED_INPUT {
                return Err(DrbgError::InputTooLong {
                    limit: MAX_SEED_INPUT,
                    actual: input.len(),
                });
            }
        }

        let mut hasher = Sha3_256::new();
        hasher.update(SEED_DOMAIN);
        hasher.update(entropy);
        hasher.update(nonce);
        hasher.update(additional);
        Ok(Drbg { state: hasher.finalize().into(), blocks: 0 })
    }

    /// Whether the reseed interval is exhausted.
    pub fn needs_reseed(&self) -> bool {
        self.blocks >= RESEED_INTERVAL
    }

    /// Mixes fresh entropy into the state and resets the block counter.
    ///
    /// # Errors
    ///
    /// - [`DrbgError::EntropyTooShort`] below the security level
    /// - [`DrbgError::InputTooLong`] for any input beyond 1024 bytes
    pub fn reseed(&mut self, entropy: &[u8], additional: &[u8]) -> Result<(), DrbgError> {
        if entropy.len() < MIN_RESEED_ENTROPY {
            return Err(DrbgError::EntropyTooShort {
                minimum: MIN_RESEED_ENTROPY,
                actual: entropy.len(),
            });
        }
        for input in [entropy, additional] {
            if input.len() > MAX_SEED_INPUT {
                return Err(DrbgError::InputTooLong {
                    limit: MAX_SEED_INPUT,
                    actual: input.len(),
                });
            }
        }

        let mut hasher = Sha3_256::new();
        hasher.update(RESEED_DOMAIN);
        hasher.update(self.state);
        hasher.update(entropy);
        hasher.update(additional);
        let next: [u8; 32] = hasher.finalize().into();
        self.state.zeroize();
        self.state = next;
        self.blocks = 0;
        Ok(())
    }

    /// Fills `out` with pseudo-random bytes.
    ///
    /// Each block performs two scalar multiplications: the P-multiple
    /// becomes the next state, the Q-multiple's x coordinate yields up to
    /// 29 output bytes.
    ///
    /// # Errors
    ///
    /// - [`DrbgError::RequestTooLarge`] for requests beyond the total the
    ///   generator may emit between reseeds
    /// - [`DrbgError::NeedsReseed`] once the block counter would pass the
    ///   reseed interval; nothing is written in that case
    pub fn sample(&mut self, out: &mut [u8]) -> Result<(), DrbgError> {
        let limit = RESEED_INTERVAL * BLOCK_SIZE as u64;
        if out.len() as u64 > limit {
            return Err(DrbgError::RequestTooLarge { limit, actual: out.len() as u64 });
        }
        let blocks_needed = out.len().div_ceil(BLOCK_SIZE) as u64;
        if self.needs_reseed() || self.blocks + blocks_needed > RESEED_INTERVAL {
            return Err(DrbgError::NeedsReseed);
        }

        for chunk in out.chunks_mut(BLOCK_SIZE) {
            let s = Scalar::from_bytes(self.state);

            let mut state_point = (&*GENERATOR * &s).serialize();
            let mut output_point = (&*DRBG_Q * &s).serialize();

            self.state.copy_from_slice(&state_point[..32]);
            chunk.copy_from_slice(&output_point[3..3 + chunk.len()]);

            state_point.zeroize();
            output_point.zeroize();
            self.blocks += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Drbg {
        Drbg::new(&[0xA5; 32], b"nonce", b"").unwrap()
    }

    #[test]
    fn identical_seeds_produce_identical_streams() {
        let mut a = seeded();
        let mut b = seeded();
        let mut out_a = [0u8; 100];
        let mut out_b = [0u8; 100];
        a.sample(&mut out_a).unwrap();
        b.sample(&mut out_b).unwrap();
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn different_nonces_produce_different_streams() {
        let mut a = Drbg::new(&[0xA5; 32], b"nonce-1", b"").unwrap();
        let mut b = Drbg::new(&[0xA5; 32], b"nonce-2", b"").unwrap();
        let mut out_a = [0u8; 64];
        let mut out_b = [0u8; 64];
        a.sample(&mut out_a).unwrap();
        b.sample(&mut out_b).unwrap();
        assert_ne!(out_a, out_b);
    }

    #[test]
    fn successive_samples_differ() {
        let mut drbg = seeded();
        let mut first = [0u8; 29];
        let mut second = [0u8; 29];
        drbg.sample(&mut first).unwrap();
        drbg.sample(&mut second).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn rejects_short_entropy() {
        assert!(matches!(
            Drbg::new(&[0u8; 31], b"", b""),
            Err(DrbgError::EntropyTooShort { minimum: 32, actual: 31 })
        ));
    }

    #[test]
    fn rejects_oversize_inputs() {
        let big = vec![0u8; MAX_SEED_INPUT + 1];
        assert!(matches!(
            Drbg::new(&big, b"", b""),
            Err(DrbgError::InputTooLong { .. })
        ));
        assert!(matches!(
            Drbg::new(&[0u8; 32], &big, b""),
            Err(DrbgError::InputTooLong { .. })
        ));
        let mut drbg = seeded();
        assert!(matches!(
            drbg.reseed(&big, b""),
            Err(DrbgError::InputTooLong { .. })
        ));
    }

    #[test]
    fn exhausted_interval_demands_reseed() {
        let mut drbg = seeded();
        drbg.blocks = RESEED_INTERVAL;
        assert!(drbg.needs_reseed());

        let mut out = [0u8; 1];
        assert_eq!(drbg.sample(&mut out), Err(DrbgError::NeedsReseed));
        assert_eq!(out, [0u8; 1]);

        drbg.reseed(&[0x5A; 16], b"").unwrap();
        assert!(!drbg.needs_reseed());
        drbg.sample(&mut out).unwrap();
    }

    #[test]
    fn request_crossing_the_interval_is_refused_up_front() {
        let mut drbg = seeded();
        drbg.blocks = RESEED_INTERVAL - 1;
        // Two blocks needed, one block left.
        let mut out = [0u8; BLOCK_SIZE + 1];
        assert_eq!(drbg.sample(&mut out), Err(DrbgError::NeedsReseed));

        // A single remaining block is still served.
        let mut last = [0u8; BLOCK_SIZE];
        drbg.sample(&mut last).unwrap();
        assert!(drbg.needs_reseed());
    }

    #[test]
    fn reseed_changes_the_stream() {
        let mut plain = seeded();
        let mut reseeded = seeded();
        reseeded.reseed(&[0x77; 16], b"").unwrap();

        let mut out_plain = [0u8; 29];
        let mut out_reseeded = [0u8; 29];
        plain.sample(&mut out_plain).unwrap();
        reseeded.sample(&mut out_reseeded).unwrap();
        assert_ne!(out_plain, out_reseeded);
    }

    #[test]
    fn short_reseed_entropy_is_rejected() {
        let mut drbg = seeded();
        assert!(matches!(
            drbg.reseed(&[0u8; 15], b""),
            Err(DrbgError::EntropyTooShort { minimum: 16, actual: 15 })
        ));
    }
}
