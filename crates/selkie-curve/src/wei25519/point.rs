//! Group law on Wei25519 in homogeneous projective coordinates
//!
//! Points are (X : Y : Z) with y^2 z = x^3 + a x z^2 + b z^3; the point at
//! infinity is (0 : 1 : 0). Doubling and addition keep a uniform operation
//! sequence: the degenerate operands (identity, inverse pairs) are folded
//! in with masked selects rather than branches, so the Montgomery ladder
//! built on them runs in time independent of the scalar value.

use std::ops::{Add, Mul, Neg};

use zeroize::Zeroize;

use super::constants::{CURVE_A, CURVE_B};
use super::field::FieldElement;
use super::scalar::Scalar;
use crate::error::CurveError;

/// Serialized point width: affine X and Y, each 32 bytes big-endian.
pub const POINT_LENGTH: usize = 64;

/// A point on Wei25519 in projective coordinates.
///
/// Copied by value; nothing here aliases. Coordinates produced by the group
/// operations stay within the field's multiplication magnitude bounds.
#[derive(Clone, Copy, Zeroize)]
pub struct ProjectivePoint {
    x: FieldElement,
    y: FieldElement,
    z: FieldElement,
}

impl ProjectivePoint {
    /// The point at infinity (0 : 1 : 0).
    pub const IDENTITY: ProjectivePoint = ProjectivePoint {
        x: FieldElement::ZERO,
        y: FieldElement::ONE,
        z: FieldElement::ZERO,
    };

    /// Builds a point from affine coordinates (Z = 1). The coordinates are
    /// not validated; see [`deserialize`](Self::deserialize) for the
    /// checked path.
    pub fn from_affine(x: FieldElement, y: FieldElement) -> ProjectivePoint {
        ProjectivePoint { x, y, z: FieldElement::ONE }
    }

    /// Whether this is the point at infinity.
    pub fn is_identity(&self) -> bool {
        self.z.is_zero()
    }

    /// Point doubling.
    ///
    /// W = aZ^2 + 3X^2, S = YZ, B = XYS, H = W^2 - 8B;
    /// X3 = 2HS, Y3 = W(4B - H) - 8Y^2S^2, Z3 = 8S^3.
    ///
    /// A self-inverse input (Y = 0) and the identity both collapse to
    /// Z3 = 0 with X3 = 0; the masked select forces Y3 = 1 so the result is
    /// exactly (0 : 1 : 0).
    pub fn double(&self) -> ProjectivePoint {
        let xx = self.x.square();
        let zz = self.z.square();
        let w = &(&*CURVE_A * &zz) + &(&xx * &FieldElement::THREE);
        let s = &self.y * &self.z;
        let b = &(&self.x * &self.y) * &s;

        let w2 = w.square();
        let b8 = &b * &FieldElement::EIGHT;
        let h = &w2 - &b8;

        let x3 = &(&h * &s) * &FieldElement::TWO;
        let b4 = &b * &FieldElement::FOUR;
        let yy = self.y.square();
        let ss = s.square();
        let y3 = &(&w * &(&b4 - &h)) - &(&(&yy * &ss) * &FieldElement::EIGHT);
        let z3 = &(&ss * &s) * &FieldElement::EIGHT;

        let at_infinity = u8::from(z3.is_zero());
        ProjectivePoint {
            x: x3,
            y: FieldElement::select(&y3, &FieldElement::ONE, at_infinity),
            z: z3,
        }
    }

    /// Constant-time scalar multiplication by the Montgomery ladder.
    ///
    /// Processes all 256 scalar bits with masked register swaps. The two
    /// ladder registers always hold consecutive multiples of `self`, so
    /// addition never sees equal non-identity operands, and the work done
    /// depends only on the (fixed) bit width, never the value.
    pub fn mul_scalar(&self, scalar: &Scalar) -> ProjectivePoint {
        let mut r0 = ProjectivePoint::IDENTITY;
        let mut r1 = *self;
        for i in (0..256).rev() {
            let bit = scalar.bit(i);
            ProjectivePoint::swap_points(&mut r0, &mut r1, bit);
            r1 = &r0 + &r1;
            r0 = r0.double();
            ProjectivePoint::swap_points(&mut r0, &mut r1, bit);
        }
        r0
    }

    /// Serializes to affine X || Y, each 32 bytes big-endian.
    ///
    /// The identity (Z = 0) serializes as all-zero bytes: with the field
    /// convention invert(0) = 0, both normalized coordinates vanish. Such
    /// an encoding never deserializes (it is not on the curve).
    pub fn serialize(&self) -> [u8; POINT_LENGTH] {
        let z_inv = self.z.invert();
        let x = &self.x * &z_inv;
        let y = &self.y * &z_inv;
        let mut out = [0u8; POINT_LENGTH];
        out[..32].copy_from_slice(&x.to_bytes());
        out[32..].copy_from_slice(&y.to_bytes());
        out
    }

    /// Deserializes and validates an affine X || Y encoding.
    ///
    /// # Errors
    ///
    /// - [`CurveError::InvalidLength`] when the input is not 64 bytes
    /// - [`CurveError::InvalidPoint`] when the coordinates do not satisfy
    ///   the curve equation
    pub fn deserialize(bytes: &[u8]) -> Result<ProjectivePoint, CurveError> {
        if bytes.len() != POINT_LENGTH {
            return Err(CurveError::InvalidLength {
                expected: POINT_LENGTH,
                actual: bytes.len(),
            });
        }

        let mut x_bytes = [0u8; 32];
        let mut y_bytes = [0u8; 32];
        x_bytes.copy_from_slice(&bytes[..32]);
        y_bytes.copy_from_slice(&bytes[32..]);

        let x = FieldElement::from_bytes(&x_bytes);
        let y = FieldElement::from_bytes(&y_bytes);

        // y^2 = x^3 + a*x + b in affine form.
        let lhs = y.square();
        let rhs = &(&(&x.square() * &x) + &(&*CURVE_A * &x)) + &CURVE_B;
        if !lhs.ct_equal(&rhs) {
            return Err(CurveError::InvalidPoint);
        }
        Ok(ProjectivePoint::from_affine(x, y))
    }

    /// Checks the homogeneous curve equation directly on the projective
    /// coordinates. Debug aid; the identity and any (0 : y : 0) class
    /// member count as valid, all-zero coordinates do not.
    pub fn is_valid(&self) -> bool {
        if self.x.is_zero() && self.y.is_zero() && self.z.is_zero() {
            return false;
        }
        // y^2 z = x^3 + a x z^2 + b z^3
        let zz = self.z.square();
        let lhs = &self.y.square() * &self.z;
        let rhs = &(&(&self.x.square() * &self.x) + &(&(&*CURVE_A * &self.x) * &zz))
            + &(&(&*CURVE_B * &zz) * &self.z);
        lhs.ct_equal(&rhs)
    }

    /// Constant-time select: `a` when `choice` is 0, `b` when 1.
    fn select(a: &ProjectivePoint, b: &ProjectivePoint, choice: u8) -> ProjectivePoint {
        ProjectivePoint {
            x: FieldElement::select(&a.x, &b.x, choice),
            y: FieldElement::select(&a.y, &b.y, choice),
            z: FieldElement::select(&a.z, &b.z, choice),
        }
    }

    /// Constant-time swap of both registers when `choice` is 1.
    fn swap_points(a: &mut ProjectivePoint, b: &mut ProjectivePoint, choice: u8) {
        FieldElement::swap(&mut a.x, &mut b.x, choice);
        FieldElement::swap(&mut a.y, &mut b.y, choice);
        FieldElement::swap(&mut a.z, &mut b.z, choice);
    }
}

impl Add<&ProjectivePoint> for &ProjectivePoint {
    type Output = ProjectivePoint;

    /// Point addition for distinct operands.
    ///
    /// Precondition: the operands differ unless both are the identity (use
    /// [`ProjectivePoint::double`] for equal points). Either operand being
    /// the identity selects the other; P + (-P) falls out of the formula as
    /// (0 : y : 0), which is the identity class.
    fn add(self, other: &ProjectivePoint) -> ProjectivePoint {
        let u1 = &other.y * &self.z;
        let u2 = &self.y * &other.z;
        let v1 = &other.x * &self.z;
        let v2 = &self.x * &other.z;

        let u = &u1 - &u2;
        let v = &v1 - &v2;
        let w = &self.z * &other.z;

        let vv = v.square();
        let vvv = &vv * &v;
        let r = &vv * &v2;
        let uu = u.square();

        let a = &(&(&uu * &w) - &vvv) - &(&r * &FieldElement::TWO);
        let x3 = &v * &a;
        let y3 = &(&u * &(&r - &a)) - &(&vvv * &u2);
        let z3 = &vvv * &w;

        let sum = ProjectivePoint { x: x3, y: y3, z: z3 };
        // Identity operands, selected without branching on point values.
        let sum = ProjectivePoint::select(&sum, other, u8::from(self.is_identity()));
        ProjectivePoint::select(&sum, self, u8::from(other.is_identity()))
    }
}

impl Neg for &ProjectivePoint {
    type Output = ProjectivePoint;

    /// The additive inverse (X : -Y : Z).
    fn neg(self) -> ProjectivePoint {
        ProjectivePoint { x: self.x, y: -&self.y, z: self.z }
    }
}

impl Mul<&Scalar> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn mul(self, scalar: &Scalar) -> ProjectivePoint {
        self.mul_scalar(scalar)
    }
}
