//! Wei25519: Curve25519 in short-Weierstrass form
//!
//! The layer stack, leaves first:
//!
//! ```text
//! field      GF(2^255 - 19), ten-limb radix 2^25.5
//!   │
//! scalar     Z/nZ, 32-byte big-endian, n = curve group order
//!   │
//! point      projective group law + constant-time Montgomery ladder
//!   │
//! keys       keypair generation, Diffie-Hellman, Schnorr signatures
//! ```
//!
//! Constant-time discipline: scalar multiplication, limb select/swap, and
//! all secret-dependent comparisons run a uniform operation sequence.
//! Verification paths that only touch public data are exempt.

pub mod constants;
pub mod field;
pub mod keys;
pub mod point;
pub mod scalar;

pub use field::FieldElement;
pub use keys::{Keypair, SECRET_KEY_LENGTH, SIGNATURE_LENGTH, verify};
pub use point::{POINT_LENGTH, ProjectivePoint};
pub use scalar::Scalar;
