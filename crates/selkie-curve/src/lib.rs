//! Selkie elliptic-curve primitives
//!
//! A from-scratch implementation of Wei25519 (Curve25519 in short
//! Weierstrass form) with the pieces the Selkie messaging core builds on:
//! field and scalar arithmetic, a constant-time group layer, key
//! generation and exchange, Schnorr-style signatures, and a Dual-EC-style
//! deterministic random bit generator.
//!
//! # Design
//!
//! All operations are synchronous and allocation-light; entropy and hash
//! primitives are injected by the caller rather than fetched internally,
//! which keeps every function deterministic under test. Objects are
//! single-writer per call; the curve constants are immutable process-wide
//! statics and safe to share.
//!
//! # Security
//!
//! - Scalar multiplication cost depends only on the scalar bit width
//! - Select, swap, and secret comparisons are branch-free bitmask code
//! - Secret scalars and DRBG state are zeroized on drop, including on
//!   failure paths

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod drbg;
pub mod error;
pub mod wei25519;

pub use drbg::Drbg;
pub use error::{CurveError, DrbgError};
pub use wei25519::{
    FieldElement, Keypair, POINT_LENGTH, ProjectivePoint, SECRET_KEY_LENGTH, SIGNATURE_LENGTH,
    Scalar, verify,
};
