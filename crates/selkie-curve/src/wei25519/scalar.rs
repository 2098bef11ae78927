//! Arithmetic modulo the Wei25519 group order
//!
//! Scalars are 32-byte big-endian integers modulo
//! n = 2^252 + 27742317777372353535851937790883648493. Multiplication works
//! on sixteen 16-bit half-limbs (byte order reversed internally) and folds
//! the 512-bit product back below 2^256 with the negative multipliers of
//! 2^256 mod n; the result is only canonicalized on request.

use std::fmt;

use rand_core::CryptoRngCore;
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

use crate::error::CurveError;

/// The group order n as sixteen little-endian 16-bit limbs.
const ORDER_LIMBS: [u16; 16] = [
    0xd3ed, 0x5cf5, 0x631a, 0x5812, 0x9cd6, 0xa2f7, 0xf9de, 0x14de, 0x0000, 0x0000, 0x0000,
    0x0000, 0x0000, 0x0000, 0x0000, 0x1000,
];

/// The nine 16-bit limbs of 16 * (n - 2^252); 2^256 is congruent to the
/// negative of this value mod n, which is what the folding passes subtract.
const FOLD_LIMBS: [i64; 9] = [
    0x3ed0, 0xcf5d, 0x31a5, 0x8126, 0xcd65, 0x2f79, 0x9dea, 0x4def, 0x0001,
];

/// An integer modulo the group order, 32 bytes big-endian.
///
/// Values are not forced into canonical form; [`reduce`](Self::reduce)
/// canonicalizes and [`is_reduced`](Self::is_reduced) tests for it.
#[derive(Clone, Copy, Zeroize)]
pub struct Scalar(pub(crate) [u8; 32]);

impl Scalar {
    /// The scalar 0.
    pub const ZERO: Scalar = Scalar([0; 32]);

    /// Builds a scalar from 32 big-endian bytes without reducing.
    pub fn from_bytes(bytes: [u8; 32]) -> Scalar {
        Scalar(bytes)
    }

    /// The big-endian byte representation.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Bit `i` of the scalar, counting from the least significant.
    pub(crate) fn bit(&self, i: usize) -> u8 {
        debug_assert!(i < 256);
        (self.0[31 - i / 8] >> (i % 8)) & 1
    }

    fn to_limbs(self) -> [i64; 16] {
        let mut limbs = [0i64; 16];
        for (i, limb) in limbs.iter_mut().enumerate() {
            *limb = i64::from(self.0[31 - 2 * i]) | (i64::from(self.0[30 - 2 * i]) << 8);
        }
        limbs
    }

    fn from_limbs(limbs: &[i64; 16]) -> Scalar {
        let mut bytes = [0u8; 32];
        for (i, &limb) in limbs.iter().enumerate() {
            debug_assert!((0..=0xFFFF).contains(&limb));
            bytes[31 - 2 * i] = (limb & 0xFF) as u8;
            bytes[30 - 2 * i] = ((limb >> 8) & 0xFF) as u8;
        }
        Scalar(bytes)
    }

    /// Computes (a * b + c) mod n.
    ///
    /// The result fits 256 bits but is not guaranteed canonical; callers
    /// needing a value below n follow up with [`reduce`](Self::reduce).
    /// Constant time with respect to all three inputs.
    pub fn mul_add(a: &Scalar, b: &Scalar, c: &Scalar) -> Scalar {
        let al = a.to_limbs();
        let bl = b.to_limbs();
        let cl = c.to_limbs();

        // Schoolbook product plus addend; each accumulator stays well below
        // 2^40 before the first carry pass.
        let mut t = [0i64; 33];
        for i in 0..16 {
            for j in 0..16 {
                t[i + j] += al[i] * bl[j];
            }
        }
        for i in 0..16 {
            t[i] += cl[i];
        }
        carry_pass(&mut t, 32);
        // The product of two 256-bit values plus a 256-bit addend never
        // carries past limb 31.
        debug_assert_eq!(t[32], 0);

        // Three folding passes: substitute 2^256 with -16*(n - 2^252) until
        // everything sits in the low sixteen limbs. The spill of each pass
        // shrinks fast enough that pass three only sees a single limb.
        fold_pass(&mut t, 32, 24);
        fold_pass(&mut t, 25, 16);
        fold_pass(&mut t, 17, 16);

        // The remaining overflow limb is 0 or -1; a masked add of n fixes
        // the negative case without branching.
        debug_assert!(t[16] == 0 || t[16] == -1);
        let mask = t[16];
        for (i, &limb) in ORDER_LIMBS.iter().enumerate() {
            t[i] += i64::from(limb) & mask;
        }
        t[16] = 0;
        carry_pass(&mut t, 16);
        t[16] += mask;
        debug_assert_eq!(t[16], 0);

        let mut low = [0i64; 16];
        low.copy_from_slice(&t[..16]);
        Scalar::from_limbs(&low)
    }

    /// Canonicalizes into [0, n) with sixteen masked conditional subtracts
    /// (the value is below 2^256 < 16n). Constant time.
    pub fn reduce(&self) -> Scalar {
        let mut limbs = [0u16; 16];
        for (i, limb) in limbs.iter_mut().enumerate() {
            *limb = u16::from(self.0[31 - 2 * i]) | (u16::from(self.0[30 - 2 * i]) << 8);
        }
        for _ in 0..16 {
            let (diff, borrow) = sub_order(&limbs);
            // borrow == 1 means the value was already below n; keep it.
            let keep = borrow.wrapping_neg();
            for i in 0..16 {
                limbs[i] = (limbs[i] & keep) | (diff[i] & !keep);
            }
        }
        let mut bytes = [0u8; 32];
        for (i, &limb) in limbs.iter().enumerate() {
            bytes[31 - 2 * i] = (limb & 0xFF) as u8;
            bytes[30 - 2 * i] = (limb >> 8) as u8;
        }
        Scalar(bytes)
    }

    /// Whether the value already lies in [0, n). Constant time.
    pub fn is_reduced(&self) -> bool {
        let mut limbs = [0u16; 16];
        for (i, limb) in limbs.iter_mut().enumerate() {
            *limb = u16::from(self.0[31 - 2 * i]) | (u16::from(self.0[30 - 2 * i]) << 8);
        }
        let (_, borrow) = sub_order(&limbs);
        Choice::from(borrow as u8).into()
    }

    /// Constant-time zero test.
    pub fn is_zero(&self) -> bool {
        self.0.ct_eq(&[0u8; 32]).into()
    }

    /// Constant-time equality on the raw representation.
    pub fn ct_equal(&self, other: &Scalar) -> bool {
        self.0.ct_eq(&other.0).into()
    }

    /// Rejection-samples a nonzero reduced scalar whose value fits in the
    /// `byte_size` low-order bytes (high-order bytes stay zero).
    ///
    /// Loops until the source produces an acceptable value; a failing source
    /// surfaces [`CurveError::InsufficientRandomness`] and is never retried
    /// internally.
    pub fn random(rng: &mut impl CryptoRngCore, byte_size: usize) -> Result<Scalar, CurveError> {
        if byte_size == 0 || byte_size > 32 {
            return Err(CurveError::InvalidLength { expected: 32, actual: byte_size });
        }
        loop {
            let mut bytes = [0u8; 32];
            rng.try_fill_bytes(&mut bytes[32 - byte_size..])
                .map_err(|_| CurveError::InsufficientRandomness)?;
            let candidate = Scalar(bytes);
            if candidate.is_reduced() && !candidate.is_zero() {
                return Ok(candidate);
            }
        }
    }
}

// Scalars routinely hold secret keys; Debug stays opaque.
impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scalar").finish_non_exhaustive()
    }
}

/// Subtracts n limb-wise, returning the difference and the final borrow
/// (1 when the input was below n). Constant time.
fn sub_order(limbs: &[u16; 16]) -> ([u16; 16], u16) {
    let mut out = [0u16; 16];
    let mut borrow: i32 = 0;
    for i in 0..16 {
        let d = i32::from(limbs[i]) - i32::from(ORDER_LIMBS[i]) + borrow;
        out[i] = (d & 0xFFFF) as u16;
        borrow = d >> 16;
    }
    (out, (borrow & 1) as u16)
}

/// Signed carry propagation bringing limbs 0..len into [0, 2^16), pushing
/// the surplus into limb `len`.
fn carry_pass(t: &mut [i64; 33], len: usize) {
    for i in 0..len {
        let carry = t[i] >> 16;
        t[i] -= carry << 16;
        t[i + 1] += carry;
    }
}

/// Clears limbs 16..hi by substituting each 2^(16i) with
/// -16*(n - 2^252) * 2^(16(i-16)), then re-carries up to `carry_to`.
fn fold_pass(t: &mut [i64; 33], hi: usize, carry_to: usize) {
    for i in 16..hi {
        let v = t[i];
        t[i] = 0;
        for (j, &m) in FOLD_LIMBS.iter().enumerate() {
            t[i - 16 + j] -= v * m;
        }
    }
    carry_pass(t, carry_to);
}
