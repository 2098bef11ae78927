//! Wei25519 curve constants
//!
//! The short-Weierstrass form of Curve25519 over GF(2^255 - 19):
//! y^2 = x^3 + a*x + b, with the base point mapped from the Montgomery
//! u = 9 point. All constants are 32-byte big-endian encodings decoded once
//! into process-wide statics.

use std::sync::LazyLock;

use super::field::FieldElement;
use super::point::ProjectivePoint;

/// Coefficient a = (3 - A^2)/3 mod p for the Montgomery A = 486662.
pub const A_BYTES: [u8; 32] = [
    0x2a, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa,
    0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0x98, 0x49, 0x14,
    0xa1, 0x44,
];

/// Coefficient b = (2A^3 - 9A)/27 mod p.
pub const B_BYTES: [u8; 32] = [
    0x7b, 0x42, 0x5e, 0xd0, 0x97, 0xb4, 0x25, 0xed, 0x09, 0x7b, 0x42, 0x5e, 0xd0, 0x97, 0xb4,
    0x25, 0xed, 0x09, 0x7b, 0x42, 0x5e, 0xd0, 0x97, 0xb4, 0x26, 0x0b, 0x5e, 0x9c, 0x77, 0x10,
    0xc8, 0x64,
];

/// Base point X coordinate (the Montgomery u = 9 point mapped through
/// x = u + A/3).
pub const GX_BYTES: [u8; 32] = [
    0x2a, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa,
    0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xad,
    0x24, 0x5a,
];

/// Base point Y coordinate.
pub const GY_BYTES: [u8; 32] = [
    0x20, 0xae, 0x19, 0xa1, 0xb8, 0xa0, 0x86, 0xb4, 0xe0, 0x1e, 0xdd, 0x2c, 0x77, 0x48, 0xd1,
    0x4c, 0x92, 0x3d, 0x4d, 0x7e, 0x6d, 0x7c, 0x61, 0xb2, 0x29, 0xe9, 0xc5, 0xa2, 0x7e, 0xce,
    0xd3, 0xd9,
];

/// Group order n = 2^252 + 27742317777372353535851937790883648493.
pub const ORDER_BYTES: [u8; 32] = [
    0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x14, 0xde, 0xf9, 0xde, 0xa2, 0xf7, 0x9c, 0xd6, 0x58, 0x12, 0x63, 0x1a, 0x5c, 0xf5,
    0xd3, 0xed,
];

/// X coordinate of the second generator used by the DRBG output stage.
pub const DRBG_QX_BYTES: [u8; 32] = [
    0x4c, 0x7d, 0xfa, 0x2c, 0x6e, 0x6c, 0x23, 0x2e, 0x29, 0x16, 0xdf, 0x03, 0x0e, 0x88, 0x9f,
    0x91, 0x65, 0x83, 0xed, 0x6b, 0x84, 0x54, 0x2c, 0xb1, 0xec, 0x87, 0xb2, 0xee, 0x30, 0xae,
    0x59, 0xfb,
];

/// Y coordinate of the second generator used by the DRBG output stage.
pub const DRBG_QY_BYTES: [u8; 32] = [
    0x21, 0x61, 0x4b, 0xd5, 0x67, 0x0a, 0x2e, 0x32, 0x5d, 0x45, 0x0d, 0x42, 0xce, 0x5b, 0xaf,
    0x1d, 0xbc, 0xc6, 0x60, 0x04, 0xe1, 0x9c, 0x7d, 0x1d, 0x48, 0xee, 0x1b, 0xd7, 0xaf, 0x0e,
    0xce, 0x03,
];

/// Coefficient a as a field element.
pub static CURVE_A: LazyLock<FieldElement> =
    LazyLock::new(|| FieldElement::from_bytes(&A_BYTES));

/// Coefficient b as a field element.
pub static CURVE_B: LazyLock<FieldElement> =
    LazyLock::new(|| FieldElement::from_bytes(&B_BYTES));

/// The base point G.
pub static GENERATOR: LazyLock<ProjectivePoint> = LazyLock::new(|| {
    ProjectivePoint::from_affine(
        FieldElement::from_bytes(&GX_BYTES),
        FieldElement::from_bytes(&GY_BYTES),
    )
});

/// The DRBG second generator Q.
pub static DRBG_Q: LazyLock<ProjectivePoint> = LazyLock::new(|| {
    ProjectivePoint::from_affine(
        FieldElement::from_bytes(&DRBG_QX_BYTES),
        FieldElement::from_bytes(&DRBG_QY_BYTES),
    )
});
