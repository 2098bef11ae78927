//! Arithmetic in GF(2^255 - 19)
//!
//! Elements are held as ten signed 32-bit limbs in radix 2^25.5: even-index
//! limbs carry 26 bits, odd-index limbs 25 bits. Addition and subtraction do
//! not propagate carries; multiplication and squaring always return a fully
//! carried element. Callers chain at most two uncarried sums before feeding
//! a product (see the bound notes on each operation); debug builds assert
//! the limb magnitudes at the multiplier boundary.

use std::ops::{Add, Mul, Neg, Sub};

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// An element of GF(2^255 - 19).
///
/// A "canonical" element has even limbs in (-2^26, 2^26) and odd limbs in
/// (-2^25, 2^25); multiplication, squaring, and `from_bytes` always return
/// canonical elements. Sums and differences grow by one bit of magnitude
/// per operation and must pass through a product (or serialization) before
/// the slack exceeds four bits; products accept at most two bits of slack
/// on either input.
#[derive(Clone, Copy, Zeroize)]
pub struct FieldElement(pub(crate) [i32; 10]);

impl FieldElement {
    /// The additive identity.
    pub const ZERO: FieldElement = FieldElement([0; 10]);

    /// The multiplicative identity.
    pub const ONE: FieldElement = FieldElement([1, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

    // Small multipliers used by the group-law formulas.
    pub(crate) const TWO: FieldElement = FieldElement([2, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    pub(crate) const THREE: FieldElement = FieldElement([3, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    pub(crate) const FOUR: FieldElement = FieldElement([4, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    pub(crate) const EIGHT: FieldElement = FieldElement([8, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

    #[cfg(debug_assertions)]
    fn assert_magnitude(&self, extra_bits: u32) {
        for (i, &limb) in self.0.iter().enumerate() {
            let bound = 1i64 << (26 - (i as u32 & 1) + extra_bits);
            debug_assert!(
                i64::from(limb).abs() < bound,
                "limb {i} magnitude {limb} exceeds 2^{}",
                26 - (i as u32 & 1) + extra_bits
            );
        }
    }

    #[cfg(not(debug_assertions))]
    fn assert_magnitude(&self, _extra_bits: u32) {}

    /// Field squaring. Same contract as multiplication.
    pub fn square(&self) -> FieldElement {
        self * self
    }

    /// Multiplicative inverse via x^(p-2), p - 2 = 2^255 - 21.
    ///
    /// Fixed square-and-multiply over the public exponent: one squaring per
    /// bit, with the multiply skipped exactly at the two zero bits of p - 2.
    /// The operation sequence never depends on the value of `self`, and the
    /// inverse of zero is defined to be zero.
    pub fn invert(&self) -> FieldElement {
        // p - 2 = 0b111...1101011: bits 2 and 4 are clear, every other bit
        // below 255 is set.
        let mut t = *self;
        for i in (0..254).rev() {
            t = t.square();
            if i != 2 && i != 4 {
                t = &t * self;
            }
        }
        t
    }

    /// Decodes 32 big-endian bytes. The top bit of the first byte is
    /// ignored.
    pub fn from_bytes(bytes: &[u8; 32]) -> FieldElement {
        let mut le = [0u8; 32];
        for i in 0..32 {
            le[i] = bytes[31 - i];
        }

        let mut h = [
            load4(&le[0..4]),
            load3(&le[4..7]) << 6,
            load3(&le[7..10]) << 5,
            load3(&le[10..13]) << 3,
            load3(&le[13..16]) << 2,
            load4(&le[16..20]),
            load3(&le[20..23]) << 7,
            load3(&le[23..26]) << 5,
            load3(&le[26..29]) << 4,
            (load3(&le[29..32]) & 0x7f_ffff) << 2,
        ];

        let mut carry;
        carry = (h[9] + (1 << 24)) >> 25;
        h[0] += carry * 19;
        h[9] -= carry << 25;
        carry = (h[1] + (1 << 24)) >> 25;
        h[2] += carry;
        h[1] -= carry << 25;
        carry = (h[3] + (1 << 24)) >> 25;
        h[4] += carry;
        h[3] -= carry << 25;
        carry = (h[5] + (1 << 24)) >> 25;
        h[6] += carry;
        h[5] -= carry << 25;
        carry = (h[7] + (1 << 24)) >> 25;
        h[8] += carry;
        h[7] -= carry << 25;

        carry = (h[0] + (1 << 25)) >> 26;
        h[1] += carry;
        h[0] -= carry << 26;
        carry = (h[2] + (1 << 25)) >> 26;
        h[3] += carry;
        h[2] -= carry << 26;
        carry = (h[4] + (1 << 25)) >> 26;
        h[5] += carry;
        h[4] -= carry << 26;
        carry = (h[6] + (1 << 25)) >> 26;
        h[7] += carry;
        h[6] -= carry << 26;
        carry = (h[8] + (1 << 25)) >> 26;
        h[9] += carry;
        h[8] -= carry << 26;

        let mut r = [0i32; 10];
        for i in 0..10 {
            r[i] = h[i] as i32;
        }
        FieldElement(r)
    }

    /// Encodes the canonical representative as 32 big-endian bytes. The top
    /// bit of the first byte is always clear.
    pub fn to_bytes(self) -> [u8; 32] {
        let mut h = [0i64; 10];
        for i in 0..10 {
            h[i] = i64::from(self.0[i]);
        }
        h = carry_chain64(h);

        // Freeze to the unique representative in [0, p).
        let mut q = (h[0] + 19) >> 26;
        q = (h[1] + q) >> 25;
        q = (h[2] + q) >> 26;
        q = (h[3] + q) >> 25;
        q = (h[4] + q) >> 26;
        q = (h[5] + q) >> 25;
        q = (h[6] + q) >> 26;
        q = (h[7] + q) >> 25;
        q = (h[8] + q) >> 26;
        q = (h[9] + q) >> 25;

        h[0] += q * 19;

        let mut carry;
        carry = h[0] >> 26;
        h[1] += carry;
        h[0] -= carry << 26;
        carry = h[1] >> 25;
        h[2] += carry;
        h[1] -= carry << 25;
        carry = h[2] >> 26;
        h[3] += carry;
        h[2] -= carry << 26;
        carry = h[3] >> 25;
        h[4] += carry;
        h[3] -= carry << 25;
        carry = h[4] >> 26;
        h[5] += carry;
        h[4] -= carry << 26;
        carry = h[5] >> 25;
        h[6] += carry;
        h[5] -= carry << 25;
        carry = h[6] >> 26;
        h[7] += carry;
        h[6] -= carry << 26;
        carry = h[7] >> 25;
        h[8] += carry;
        h[7] -= carry << 25;
        carry = h[8] >> 26;
        h[9] += carry;
        h[8] -= carry << 26;
        h[9] &= (1 << 25) - 1;

        let mut le = [0u8; 32];
        le[0] = h[0] as u8;
        le[1] = (h[0] >> 8) as u8;
        le[2] = (h[0] >> 16) as u8;
        le[3] = ((h[0] >> 24) | (h[1] << 2)) as u8;
        le[4] = (h[1] >> 6) as u8;
        le[5] = (h[1] >> 14) as u8;
        le[6] = ((h[1] >> 22) | (h[2] << 3)) as u8;
        le[7] = (h[2] >> 5) as u8;
        le[8] = (h[2] >> 13) as u8;
        le[9] = ((h[2] >> 21) | (h[3] << 5)) as u8;
        le[10] = (h[3] >> 3) as u8;
        le[11] = (h[3] >> 11) as u8;
        le[12] = ((h[3] >> 19) | (h[4] << 6)) as u8;
        le[13] = (h[4] >> 2) as u8;
        le[14] = (h[4] >> 10) as u8;
        le[15] = (h[4] >> 18) as u8;
        le[16] = h[5] as u8;
        le[17] = (h[5] >> 8) as u8;
        le[18] = (h[5] >> 16) as u8;
        le[19] = ((h[5] >> 24) | (h[6] << 1)) as u8;
        le[20] = (h[6] >> 7) as u8;
        le[21] = (h[6] >> 15) as u8;
        le[22] = ((h[6] >> 23) | (h[7] << 3)) as u8;
        le[23] = (h[7] >> 5) as u8;
        le[24] = (h[7] >> 13) as u8;
        le[25] = ((h[7] >> 21) | (h[8] << 4)) as u8;
        le[26] = (h[8] >> 4) as u8;
        le[27] = (h[8] >> 12) as u8;
        le[28] = ((h[8] >> 20) | (h[9] << 6)) as u8;
        le[29] = (h[9] >> 2) as u8;
        le[30] = (h[9] >> 10) as u8;
        le[31] = (h[9] >> 18) as u8;

        let mut be = [0u8; 32];
        for i in 0..32 {
            be[i] = le[31 - i];
        }
        be
    }

    /// Constant-time zero test. Canonicalizes first, then compares the
    /// serialized bytes against zero without early exit.
    pub fn is_zero(&self) -> bool {
        self.to_bytes().ct_eq(&[0u8; 32]).into()
    }

    /// Constant-time equality on the canonical representatives.
    pub fn ct_equal(&self, other: &FieldElement) -> bool {
        self.to_bytes().ct_eq(&other.to_bytes()).into()
    }

    /// Constant-time select: returns `a` when `choice` is 0 and `b` when
    /// `choice` is 1, via bitmask arithmetic only.
    pub fn select(a: &FieldElement, b: &FieldElement, choice: u8) -> FieldElement {
        debug_assert!(choice <= 1);
        let mask = -i32::from(choice);
        let mut r = [0i32; 10];
        for i in 0..10 {
            r[i] = a.0[i] ^ (mask & (a.0[i] ^ b.0[i]));
        }
        FieldElement(r)
    }

    /// Constant-time swap of `a` and `b` when `choice` is 1, via bitmask
    /// arithmetic only.
    pub fn swap(a: &mut FieldElement, b: &mut FieldElement, choice: u8) {
        debug_assert!(choice <= 1);
        let mask = -i32::from(choice);
        for i in 0..10 {
            let t = mask & (a.0[i] ^ b.0[i]);
            a.0[i] ^= t;
            b.0[i] ^= t;
        }
    }
}

impl Add<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    /// Limb-wise sum. No carry is performed; the result grows one bit of
    /// magnitude over the larger input.
    fn add(self, rhs: &FieldElement) -> FieldElement {
        self.assert_magnitude(4);
        rhs.assert_magnitude(4);
        let mut r = [0i32; 10];
        for i in 0..10 {
            r[i] = self.0[i] + rhs.0[i];
        }
        FieldElement(r)
    }
}

impl Sub<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    /// Limb-wise difference. Same magnitude contract as addition.
    fn sub(self, rhs: &FieldElement) -> FieldElement {
        self.assert_magnitude(4);
        rhs.assert_magnitude(4);
        let mut r = [0i32; 10];
        for i in 0..10 {
            r[i] = self.0[i] - rhs.0[i];
        }
        FieldElement(r)
    }
}

impl Neg for &FieldElement {
    type Output = FieldElement;

    /// Limb-wise negation; the magnitude is unchanged.
    fn neg(self) -> FieldElement {
        let mut r = [0i32; 10];
        for i in 0..10 {
            r[i] = -self.0[i];
        }
        FieldElement(r)
    }
}

impl Mul<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    /// Field multiplication. Inputs may carry up to two bits of magnitude
    /// slack; the result is canonical.
    ///
    /// Schoolbook product with the 2^255 = 19 fold applied on the fly,
    /// followed by the interleaved carry chain.
    fn mul(self, rhs: &FieldElement) -> FieldElement {
        self.assert_magnitude(2);
        rhs.assert_magnitude(2);

        let a0 = i64::from(self.0[0]);
        let a1 = i64::from(self.0[1]);
        let a2 = i64::from(self.0[2]);
        let a3 = i64::from(self.0[3]);
        let a4 = i64::from(self.0[4]);
        let a5 = i64::from(self.0[5]);
        let a6 = i64::from(self.0[6]);
        let a7 = i64::from(self.0[7]);
        let a8 = i64::from(self.0[8]);
        let a9 = i64::from(self.0[9]);

        let b0 = i64::from(rhs.0[0]);
        let b1 = i64::from(rhs.0[1]);
        let b2 = i64::from(rhs.0[2]);
        let b3 = i64::from(rhs.0[3]);
        let b4 = i64::from(rhs.0[4]);
        let b5 = i64::from(rhs.0[5]);
        let b6 = i64::from(rhs.0[6]);
        let b7 = i64::from(rhs.0[7]);
        let b8 = i64::from(rhs.0[8]);
        let b9 = i64::from(rhs.0[9]);

        let b1_19 = b1 * 19;
        let b2_19 = b2 * 19;
        let b3_19 = b3 * 19;
        let b4_19 = b4 * 19;
        let b5_19 = b5 * 19;
        let b6_19 = b6 * 19;
        let b7_19 = b7 * 19;
        let b8_19 = b8 * 19;
        let b9_19 = b9 * 19;
        let a1_2 = a1 * 2;
        let a3_2 = a3 * 2;
        let a5_2 = a5 * 2;
        let a7_2 = a7 * 2;
        let a9_2 = a9 * 2;

        let c0 = a0 * b0
            + a1_2 * b9_19
            + a2 * b8_19
            + a3_2 * b7_19
            + a4 * b6_19
            + a5_2 * b5_19
            + a6 * b4_19
            + a7_2 * b3_19
            + a8 * b2_19
            + a9_2 * b1_19;
        let c1 = a0 * b1
            + a1 * b0
            + a2 * b9_19
            + a3 * b8_19
            + a4 * b7_19
            + a5 * b6_19
            + a6 * b5_19
            + a7 * b4_19
            + a8 * b3_19
            + a9 * b2_19;
        let c2 = a0 * b2
            + a1_2 * b1
            + a2 * b0
            + a3_2 * b9_19
            + a4 * b8_19
            + a5_2 * b7_19
            + a6 * b6_19
            + a7_2 * b5_19
            + a8 * b4_19
            + a9_2 * b3_19;
        let c3 = a0 * b3
            + a1 * b2
            + a2 * b1
            + a3 * b0
            + a4 * b9_19
            + a5 * b8_19
            + a6 * b7_19
            + a7 * b6_19
            + a8 * b5_19
            + a9 * b4_19;
        let c4 = a0 * b4
            + a1_2 * b3
            + a2 * b2
            + a3_2 * b1
            + a4 * b0
            + a5_2 * b9_19
            + a6 * b8_19
            + a7_2 * b7_19
            + a8 * b6_19
            + a9_2 * b5_19;
        let c5 = a0 * b5
            + a1 * b4
            + a2 * b3
            + a3 * b2
            + a4 * b1
            + a5 * b0
            + a6 * b9_19
            + a7 * b8_19
            + a8 * b7_19
            + a9 * b6_19;
        let c6 = a0 * b6
            + a1_2 * b5
            + a2 * b4
            + a3_2 * b3
            + a4 * b2
            + a5_2 * b1
            + a6 * b0
            + a7_2 * b9_19
            + a8 * b8_19
            + a9_2 * b7_19;
        let c7 = a0 * b7
            + a1 * b6
            + a2 * b5
            + a3 * b4
            + a4 * b3
            + a5 * b2
            + a6 * b1
            + a7 * b0
            + a8 * b9_19
            + a9 * b8_19;
        let c8 = a0 * b8
            + a1_2 * b7
            + a2 * b6
            + a3_2 * b5
            + a4 * b4
            + a5_2 * b3
            + a6 * b2
            + a7_2 * b1
            + a8 * b0
            + a9_2 * b9_19;
        let c9 = a0 * b9
            + a1 * b8
            + a2 * b7
            + a3 * b6
            + a4 * b5
            + a5 * b4
            + a6 * b3
            + a7 * b2
            + a8 * b1
            + a9 * b0;

        let h = carry_chain64([c0, c1, c2, c3, c4, c5, c6, c7, c8, c9]);
        let mut r = [0i32; 10];
        for i in 0..10 {
            r[i] = h[i] as i32;
        }
        FieldElement(r)
    }
}

/// The ref10 interleaved carry chain, bringing limbs back within canonical
/// bounds after a multiplication or before serialization.
fn carry_chain64(mut c: [i64; 10]) -> [i64; 10] {
    let mut carry;
    carry = (c[0] + (1 << 25)) >> 26;
    c[1] += carry;
    c[0] -= carry << 26;
    carry = (c[4] + (1 << 25)) >> 26;
    c[5] += carry;
    c[4] -= carry << 26;
    carry = (c[1] + (1 << 24)) >> 25;
    c[2] += carry;
    c[1] -= carry << 25;
    carry = (c[5] + (1 << 24)) >> 25;
    c[6] += carry;
    c[5] -= carry << 25;
    carry = (c[2] + (1 << 25)) >> 26;
    c[3] += carry;
    c[2] -= carry << 26;
    carry = (c[6] + (1 << 25)) >> 26;
    c[7] += carry;
    c[6] -= carry << 26;
    carry = (c[3] + (1 << 24)) >> 25;
    c[4] += carry;
    c[3] -= carry << 25;
    carry = (c[7] + (1 << 24)) >> 25;
    c[8] += carry;
    c[7] -= carry << 25;
    carry = (c[4] + (1 << 25)) >> 26;
    c[5] += carry;
    c[4] -= carry << 26;
    carry = (c[8] + (1 << 25)) >> 26;
    c[9] += carry;
    c[8] -= carry << 26;
    carry = (c[9] + (1 << 24)) >> 25;
    c[0] += carry * 19;
    c[9] -= carry << 25;

    carry = (c[0] + (1 << 25)) >> 26;
    c[1] += carry;
    c[0] -= carry << 26;
    c
}

#[inline]
fn load3(s: &[u8]) -> i64 {
    i64::from(s[0]) | (i64::from(s[1]) << 8) | (i64::from(s[2]) << 16)
}

#[inline]
fn load4(s: &[u8]) -> i64 {
    i64::from(s[0]) | (i64::from(s[1]) << 8) | (i64::from(s[2]) << 16) | (i64::from(s[3]) << 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fe(hex32: &str) -> FieldElement {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hex32, &mut bytes).unwrap();
        FieldElement::from_bytes(&bytes)
    }

    #[test]
    fn one_round_trips() {
        let mut expected = [0u8; 32];
        expected[31] = 1;
        assert_eq!(FieldElement::ONE.to_bytes(), expected);
        assert_eq!(FieldElement::from_bytes(&expected).to_bytes(), expected);
    }

    #[test]
    fn serialization_round_trips() {
        let x = fe("189ce99693cd59bf5c941cf0dc98d2c1e2acf72f9e574f7aa0ee89aed453dd32");
        let bytes = x.to_bytes();
        assert_eq!(FieldElement::from_bytes(&bytes).to_bytes(), bytes);
    }

    #[test]
    fn top_bit_is_ignored_on_input_and_clear_on_output() {
        let mut bytes = [0xFFu8; 32];
        let x = FieldElement::from_bytes(&bytes);
        bytes[0] &= 0x7F;
        let y = FieldElement::from_bytes(&bytes);
        assert_eq!(x.to_bytes(), y.to_bytes());
        assert_eq!(x.to_bytes()[0] & 0x80, 0);
    }

    #[test]
    fn non_canonical_input_is_reduced() {
        // p + 1 must encode back as 1.
        let p_plus_one = fe("7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffee");
        let mut one = [0u8; 32];
        one[31] = 1;
        assert_eq!(p_plus_one.to_bytes(), one);
    }

    #[test]
    fn mul_by_inverse_is_one() {
        let x = fe("189ce99693cd59bf5c941cf0dc98d2c1e2acf72f9e574f7aa0ee89aed453dd32");
        let product = &x * &x.invert();
        assert_eq!(product.to_bytes(), FieldElement::ONE.to_bytes());
    }

    #[test]
    fn invert_matches_reference_vector() {
        let x = fe("189ce99693cd59bf5c941cf0dc98d2c1e2acf72f9e574f7aa0ee89aed453dd32");
        let expected = "2a93974fe42f633ce64288e41244a46321e4c6eb50630c722467af9ca3608f06";
        assert_eq!(hex::encode(x.invert().to_bytes()), expected);
    }

    #[test]
    fn invert_of_zero_is_zero() {
        assert!(FieldElement::ZERO.invert().is_zero());
    }

    #[test]
    fn add_sub_round_trip() {
        let x = fe("189ce99693cd59bf5c941cf0dc98d2c1e2acf72f9e574f7aa0ee89aed453dd32");
        let y = fe("2a93974fe42f633ce64288e41244a46321e4c6eb50630c722467af9ca3608f06");
        let z = &(&x + &y) - &y;
        assert_eq!(z.to_bytes(), x.to_bytes());
    }

    #[test]
    fn neg_is_additive_inverse() {
        let x = fe("189ce99693cd59bf5c941cf0dc98d2c1e2acf72f9e574f7aa0ee89aed453dd32");
        assert!((&x + &(-&x)).is_zero());
    }

    #[test]
    fn select_and_swap_follow_choice() {
        let a = fe("189ce99693cd59bf5c941cf0dc98d2c1e2acf72f9e574f7aa0ee89aed453dd32");
        let b = fe("2a93974fe42f633ce64288e41244a46321e4c6eb50630c722467af9ca3608f06");
        assert_eq!(FieldElement::select(&a, &b, 0).to_bytes(), a.to_bytes());
        assert_eq!(FieldElement::select(&a, &b, 1).to_bytes(), b.to_bytes());

        let (mut x, mut y) = (a, b);
        FieldElement::swap(&mut x, &mut y, 0);
        assert_eq!(x.to_bytes(), a.to_bytes());
        FieldElement::swap(&mut x, &mut y, 1);
        assert_eq!(x.to_bytes(), b.to_bytes());
        assert_eq!(y.to_bytes(), a.to_bytes());
    }

    #[test]
    fn mul_distributes_over_add() {
        let x = fe("189ce99693cd59bf5c941cf0dc98d2c1e2acf72f9e574f7aa0ee89aed453dd32");
        let y = fe("2a93974fe42f633ce64288e41244a46321e4c6eb50630c722467af9ca3608f06");
        let z = fe("20ae19a1b8a086b4e01edd2c7748d14c923d4d7e6d7c61b229e9c5a27eced3d9");
        let lhs = &x * &(&y + &z);
        let rhs = &(&x * &y) + &(&x * &z);
        assert_eq!(lhs.to_bytes(), rhs.to_bytes());
    }
}
