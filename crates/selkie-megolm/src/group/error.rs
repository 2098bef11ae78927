//! Error types for group ratchet and cipher operations

use thiserror::Error;

/// Errors from Megolm ratchet, cipher, and session operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MegolmError {
    /// Session id shorter than the digest the key schedule draws on.
    #[error("session id too short: need at least {minimum} bytes, got {actual}")]
    SessionIdTooShort {
        /// Minimum session-id length
        minimum: usize,
        /// Length actually supplied
        actual: usize,
    },

    /// Ciphertext input shorter than a tag plus one cipher block.
    #[error("input too short: need at least {minimum} bytes, got {actual}")]
    InputTooShort {
        /// Minimum input length
        minimum: usize,
        /// Length actually supplied
        actual: usize,
    },

    /// Block-cipher padding was malformed after decryption.
    #[error("ciphertext padding is invalid")]
    BadPadding,

    /// The message tag did not match (authentication failure).
    #[error("message authentication failed")]
    BadMac,

    /// A pickle buffer ended before the fixed layout was complete.
    #[error("pickle too short: need {expected} bytes, got {actual}")]
    PickleTooShort {
        /// Required pickle length
        expected: usize,
        /// Length actually supplied
        actual: usize,
    },

    /// A group message failed structural decoding.
    #[error("malformed group message: {reason}")]
    BadMessageFormat {
        /// What failed to parse
        reason: String,
    },

    /// A message index earlier than any ratchet state this session holds.
    /// The ratchet only winds forward; an earlier session export is needed.
    #[error("cannot rewind ratchet: earliest known index {earliest}, requested {requested}")]
    RatchetRewind {
        /// Earliest message index this session can derive
        earliest: u32,
        /// Message index that was requested
        requested: u32,
    },
}

impl MegolmError {
    /// Returns true if this error is fatal (unrecoverable)
    ///
    /// Fatal errors indicate corruption, tampering, or caller bugs.
    /// A rewind may be recoverable with an earlier session export.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::SessionIdTooShort { .. }
            | Self::InputTooShort { .. }
            | Self::BadPadding
            | Self::BadMac
            | Self::PickleTooShort { .. }
            | Self::BadMessageFormat { .. } => true,

            Self::RatchetRewind { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_mac_is_fatal() {
        assert!(MegolmError::BadMac.is_fatal());
    }

    #[test]
    fn rewind_is_not_fatal() {
        let err = MegolmError::RatchetRewind { earliest: 10, requested: 3 };
        assert!(!err.is_fatal());
    }

    #[test]
    fn error_display() {
        let err = MegolmError::PickleTooShort { expected: 132, actual: 10 };
        assert_eq!(err.to_string(), "pickle too short: need 132 bytes, got 10");
    }
}
