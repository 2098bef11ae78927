//! Error types for curve and DRBG operations

use thiserror::Error;

/// Errors from field, scalar, point, and key operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CurveError {
    /// The caller-supplied randomness source could not produce enough
    /// bytes. Never retried internally.
    #[error("insufficient randomness from the caller-supplied source")]
    InsufficientRandomness,

    /// A buffer had the wrong length; rejected before any state changes.
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Required byte length
        expected: usize,
        /// Byte length actually supplied
        actual: usize,
    },

    /// A deserialized point is not on the curve, or the point at infinity
    /// appeared where it is disallowed.
    #[error("point is not on the curve or is the disallowed identity")]
    InvalidPoint,
}

/// Errors from the deterministic random bit generator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrbgError {
    /// Less seed material than the security level requires.
    #[error("entropy too short: need at least {minimum} bytes, got {actual}")]
    EntropyTooShort {
        /// Minimum number of entropy bytes for this operation
        minimum: usize,
        /// Bytes actually supplied
        actual: usize,
    },

    /// Entropy, nonce, or additional input beyond the fixed cap.
    #[error("seed input too long: limit {limit} bytes, got {actual}")]
    InputTooLong {
        /// Maximum accepted byte length
        limit: usize,
        /// Bytes actually supplied
        actual: usize,
    },

    /// A single request for more output than the generator may ever
    /// produce between reseeds.
    #[error("requested output too large: limit {limit} bytes, got {actual}")]
    RequestTooLarge {
        /// Maximum bytes producible between reseeds
        limit: u64,
        /// Bytes actually requested
        actual: u64,
    },

    /// The reseed interval is exhausted. Not fatal: supply fresh entropy
    /// via reseed and retry.
    #[error("reseed interval exhausted; reseed with fresh entropy")]
    NeedsReseed,
}

impl DrbgError {
    /// Whether the caller can recover by reseeding and retrying.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::NeedsReseed)
    }
}
