//! Group-message metadata encoding
//!
//! The byte-exact structure the message tag authenticates and the wire
//! header is framed with: a version byte, then tagged varint fields for
//! the message index (tag 0x08) and a byte length (tag 0x12). Varints are
//! little-endian base-128 with the high bit as the continuation flag.

use super::error::MegolmError;

/// Field tag preceding the message index.
const INDEX_TAG: u8 = 0x08;

/// Field tag preceding the length field.
const LENGTH_TAG: u8 = 0x12;

/// Decoded metadata fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageInfo {
    /// Protocol version byte
    pub version: u8,
    /// Message index within the session
    pub index: u32,
    /// Byte length carried in the length field
    pub length: usize,
}

/// Encodes (version, index, length) into the authenticated metadata
/// structure.
pub fn encode_message_info(version: u8, index: u32, length: usize) -> Vec<u8> {
    // version + two tags + two varints of at most 10 bytes
    let mut out = Vec::with_capacity(1 + 2 + 2 * 10);
    out.push(version);
    out.push(INDEX_TAG);
    encode_varint(u64::from(index), &mut out);
    out.push(LENGTH_TAG);
    encode_varint(length as u64, &mut out);
    out
}

/// Decodes a metadata structure from the front of `bytes`, returning the
/// fields and the number of bytes consumed.
///
/// # Errors
///
/// [`MegolmError::BadMessageFormat`] on truncation, a missing tag, or a
/// field that overflows its width.
pub fn decode_message_info(bytes: &[u8]) -> Result<(MessageInfo, usize), MegolmError> {
    let malformed = |reason: &str| MegolmError::BadMessageFormat { reason: reason.to_string() };

    let (&version, rest) = bytes.split_first().ok_or_else(|| malformed("missing version"))?;

    let rest = rest
        .strip_prefix(&[INDEX_TAG])
        .ok_or_else(|| malformed("missing index field"))?;
    let (index, rest) = decode_varint(rest).ok_or_else(|| malformed("bad index varint"))?;
    let index = u32::try_from(index).map_err(|_| malformed("index exceeds 32 bits"))?;

    let rest = rest
        .strip_prefix(&[LENGTH_TAG])
        .ok_or_else(|| malformed("missing length field"))?;
    let (length, rest) = decode_varint(rest).ok_or_else(|| malformed("bad length varint"))?;
    let length = usize::try_from(length).map_err(|_| malformed("length exceeds usize"))?;

    let consumed = bytes.len() - rest.len();
    Ok((MessageInfo { version, index, length }, consumed))
}

fn encode_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Decodes one varint, returning the value and the remaining bytes. `None`
/// on truncation or a value wider than 64 bits.
fn decode_varint(bytes: &[u8]) -> Option<(u64, &[u8])> {
    let mut value: u64 = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        if i == 10 {
            return None;
        }
        let payload = u64::from(byte & 0x7F);
        // The tenth byte holds only the top bit of a u64.
        if i == 9 && payload > 1 {
            return None;
        }
        value |= payload << (7 * i as u32);
        if byte & 0x80 == 0 {
            return Some((value, &bytes[i + 1..]));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_layout_for_small_fields() {
        let encoded = encode_message_info(3, 0, 5);
        assert_eq!(encoded, vec![3, 0x08, 0x00, 0x12, 0x05]);
    }

    #[test]
    fn encode_uses_continuation_bytes() {
        let encoded = encode_message_info(3, 300, 0);
        // 300 = 0b10_0101100: low seven bits 0x2C with continuation, then 2.
        assert_eq!(encoded, vec![3, 0x08, 0xAC, 0x02, 0x12, 0x00]);
    }

    #[test]
    fn round_trips() {
        for (index, length) in [(0u32, 0usize), (1, 1), (127, 128), (300, 4096), (u32::MAX, 1 << 20)]
        {
            let encoded = encode_message_info(3, index, length);
            let (info, consumed) = decode_message_info(&encoded).unwrap();
            assert_eq!(consumed, encoded.len());
            assert_eq!(info, MessageInfo { version: 3, index, length });
        }
    }

    #[test]
    fn decode_leaves_trailing_bytes() {
        let mut encoded = encode_message_info(3, 7, 2);
        let header_len = encoded.len();
        encoded.extend_from_slice(b"ciphertext");
        let (info, consumed) = decode_message_info(&encoded).unwrap();
        assert_eq!(consumed, header_len);
        assert_eq!(info.index, 7);
    }

    #[test]
    fn decode_rejects_truncation() {
        let encoded = encode_message_info(3, 300, 4096);
        for cut in 0..encoded.len() - 1 {
            assert!(decode_message_info(&encoded[..cut]).is_err(), "cut {cut}");
        }
    }

    #[test]
    fn decode_rejects_wrong_tags() {
        assert!(decode_message_info(&[3, 0x09, 0x00, 0x12, 0x00]).is_err());
        assert!(decode_message_info(&[3, 0x08, 0x00, 0x13, 0x00]).is_err());
    }

    #[test]
    fn decode_rejects_index_wider_than_32_bits() {
        // index = 2^35
        let mut bytes = vec![3, 0x08];
        bytes.extend_from_slice(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x01]);
        bytes.extend_from_slice(&[0x12, 0x00]);
        assert!(decode_message_info(&bytes).is_err());
    }

    #[test]
    fn decode_rejects_unterminated_varint() {
        let bytes = [3u8, 0x08, 0x80, 0x80];
        assert!(decode_message_info(&bytes).is_err());
    }
}
