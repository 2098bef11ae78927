//! Per-message encryption for group messages
//!
//! Each message is encrypted under keys derived from the ratchet state at
//! its index: HKDF-SHA256 expands the flat ratchet bytes into an AES-256
//! key and a CBC IV, the plaintext is encrypted with PKCS#7 padding, and
//! an 8-byte truncated HMAC-SHA3-256 over the authenticated metadata and
//! the plaintext is appended.
//!
//! Two properties of the key schedule are fixed by the wire contract with
//! peer implementations and must not be "improved" here: the MAC key is
//! the AES key rather than the independently derived slice of the HKDF
//! output, and the high-order IV bytes come from the session id rather
//! than the KDF. See DESIGN.md before touching either.

use aes::Aes256;
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use sha3::Sha3_256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::error::MegolmError;
use super::message::encode_message_info;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type HmacSha3 = Hmac<Sha3_256>;

/// Truncated message-tag width.
pub const MAC_LENGTH: usize = 8;

/// AES block width; ciphertexts are always a positive multiple of this.
pub const BLOCK_LENGTH: usize = 16;

/// Minimum session-id length: the digest width the key schedule is built
/// on.
pub const MIN_SESSION_ID_LENGTH: usize = 32;

/// IV bytes overwritten from the session id.
const IV_SESSION_BYTES: usize = 8;

/// Info string for the message key schedule.
const KEYS_INFO: &[u8] = b"MEGOLM_KEYS";

/// HKDF salt for the key schedule: a single zero byte.
const KEYS_SALT: [u8; 1] = [0x00];

/// Derived per-message keys; wiped on every exit path.
#[derive(Zeroize, ZeroizeOnDrop)]
struct MessageKeys {
    aes_key: [u8; 32],
    mac_key: [u8; 32],
    iv: [u8; BLOCK_LENGTH],
}

/// Expands ratchet bytes and the session id into the per-message keys.
fn derive_keys(key_material: &[u8], session_id: &[u8]) -> Result<MessageKeys, MegolmError> {
    if session_id.len() < MIN_SESSION_ID_LENGTH {
        return Err(MegolmError::SessionIdTooShort {
            minimum: MIN_SESSION_ID_LENGTH,
            actual: session_id.len(),
        });
    }

    let hkdf = Hkdf::<Sha256>::new(Some(&KEYS_SALT), key_material);
    let mut okm = [0u8; 80];
    let Ok(()) = hkdf.expand(KEYS_INFO, &mut okm) else {
        unreachable!("80 bytes is a valid HKDF-SHA256 output length");
    };

    let mut keys = MessageKeys {
        aes_key: [0u8; 32],
        mac_key: [0u8; 32],
        iv: [0u8; BLOCK_LENGTH],
    };
    keys.aes_key.copy_from_slice(&okm[..32]);
    // Wire contract: the MAC key duplicates the AES key; okm[32..64] is
    // discarded.
    keys.mac_key.copy_from_slice(&okm[..32]);
    keys.iv.copy_from_slice(&okm[64..80]);
    // Wire contract: the leading IV bytes are taken from the session id.
    keys.iv[..IV_SESSION_BYTES].copy_from_slice(&session_id[..IV_SESSION_BYTES]);
    okm.zeroize();

    Ok(keys)
}

/// Truncated HMAC-SHA3-256 over the metadata structure and the plaintext.
fn message_tag(
    mac_key: &[u8; 32],
    version: u8,
    index: u32,
    plaintext: &[u8],
) -> [u8; MAC_LENGTH] {
    let Ok(mut mac) = HmacSha3::new_from_slice(mac_key) else {
        unreachable!("HMAC-SHA3-256 accepts any key size");
    };
    let info = encode_message_info(version, index, plaintext.len());
    mac.update(&info);
    mac.update(plaintext);

    let digest = mac.finalize().into_bytes();
    let mut tag = [0u8; MAC_LENGTH];
    tag.copy_from_slice(&digest[..MAC_LENGTH]);
    tag
}

/// Encrypts one group message.
///
/// Returns AES-256-CBC ciphertext (PKCS#7 padded) with the 8-byte message
/// tag appended.
///
/// # Errors
///
/// [`MegolmError::SessionIdTooShort`] when the session id is below the
/// digest width.
pub fn encrypt(
    key_material: &[u8],
    session_id: &[u8],
    version: u8,
    index: u32,
    plaintext: &[u8],
) -> Result<Vec<u8>, MegolmError> {
    let keys = derive_keys(key_material, session_id)?;

    let cipher = Aes256CbcEnc::new(&keys.aes_key.into(), &keys.iv.into());
    let mut out = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let tag = message_tag(&keys.mac_key, version, index, plaintext);
    out.extend_from_slice(&tag);
    Ok(out)
}

/// Decrypts and authenticates one group message.
///
/// Splits the trailing tag, decrypts, recomputes the tag over the
/// metadata and recovered plaintext, and compares in constant time.
///
/// # Errors
///
/// - [`MegolmError::SessionIdTooShort`] for a session id below the digest
///   width
/// - [`MegolmError::InputTooShort`] when less than one block plus the tag
///   is present
/// - [`MegolmError::BadPadding`] for a ciphertext that is not a block
///   multiple or whose padding is malformed
/// - [`MegolmError::BadMac`] on tag mismatch
///
/// Recovered plaintext is wiped before any failure returns.
pub fn decrypt(
    key_material: &[u8],
    session_id: &[u8],
    version: u8,
    index: u32,
    input: &[u8],
) -> Result<Vec<u8>, MegolmError> {
    if input.len() < BLOCK_LENGTH + MAC_LENGTH {
        return Err(MegolmError::InputTooShort {
            minimum: BLOCK_LENGTH + MAC_LENGTH,
            actual: input.len(),
        });
    }
    let (ciphertext, tag) = input.split_at(input.len() - MAC_LENGTH);
    if ciphertext.len() % BLOCK_LENGTH != 0 {
        return Err(MegolmError::BadPadding);
    }

    let keys = derive_keys(key_material, session_id)?;

    let cipher = Aes256CbcDec::new(&keys.aes_key.into(), &keys.iv.into());
    let mut plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| MegolmError::BadPadding)?;

    let expected = message_tag(&keys.mac_key, version, index, &plaintext);
    if expected.ct_eq(tag).unwrap_u8() == 0 {
        plaintext.zeroize();
        return Err(MegolmError::BadMac);
    }
    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SESSION_ID: &[u8; 32] = b"selkie-session-identifier-32byte";

    fn key_material() -> [u8; 128] {
        let mut material = [0u8; 128];
        for (i, byte) in material.iter_mut().enumerate() {
            *byte = i as u8;
        }
        material
    }

    #[test]
    fn round_trips_at_boundary_lengths() {
        for len in [0usize, 1, 15, 16, 17, 4096] {
            let plaintext = vec![0x5Au8; len];
            let message = encrypt(&key_material(), SESSION_ID, 3, 42, &plaintext).unwrap();
            let recovered = decrypt(&key_material(), SESSION_ID, 3, 42, &message).unwrap();
            assert_eq!(recovered, plaintext, "length {len}");
        }
    }

    #[test]
    fn ciphertext_is_padded_to_blocks_plus_tag() {
        let message = encrypt(&key_material(), SESSION_ID, 3, 0, b"ab").unwrap();
        assert_eq!(message.len(), BLOCK_LENGTH + MAC_LENGTH);

        let message = encrypt(&key_material(), SESSION_ID, 3, 0, &[0u8; 16]).unwrap();
        assert_eq!(message.len(), 2 * BLOCK_LENGTH + MAC_LENGTH);
    }

    #[test]
    fn any_flipped_ciphertext_bit_fails_authentication() {
        let message = encrypt(&key_material(), SESSION_ID, 3, 7, b"group payload").unwrap();
        for byte in 0..message.len() - MAC_LENGTH {
            for bit in [0x01u8, 0x80] {
                let mut corrupted = message.clone();
                corrupted[byte] ^= bit;
                let result = decrypt(&key_material(), SESSION_ID, 3, 7, &corrupted);
                assert!(
                    matches!(result, Err(MegolmError::BadMac | MegolmError::BadPadding)),
                    "byte {byte} bit {bit:#x} slipped through"
                );
            }
        }
    }

    #[test]
    fn any_flipped_tag_bit_fails_authentication() {
        let message = encrypt(&key_material(), SESSION_ID, 3, 7, b"group payload").unwrap();
        for byte in message.len() - MAC_LENGTH..message.len() {
            let mut corrupted = message.clone();
            corrupted[byte] ^= 1;
            assert_eq!(
                decrypt(&key_material(), SESSION_ID, 3, 7, &corrupted),
                Err(MegolmError::BadMac)
            );
        }
    }

    #[test]
    fn wrong_index_fails_authentication() {
        let message = encrypt(&key_material(), SESSION_ID, 3, 7, b"payload").unwrap();
        assert_eq!(
            decrypt(&key_material(), SESSION_ID, 3, 8, &message),
            Err(MegolmError::BadMac)
        );
    }

    #[test]
    fn wrong_key_material_fails() {
        let message = encrypt(&key_material(), SESSION_ID, 3, 7, b"payload").unwrap();
        let mut other = key_material();
        other[0] ^= 0xFF;
        let result = decrypt(&other, SESSION_ID, 3, 7, &message);
        assert!(matches!(
            result,
            Err(MegolmError::BadMac | MegolmError::BadPadding)
        ));
    }

    #[test]
    fn short_input_is_rejected_distinctly() {
        assert_eq!(
            decrypt(&key_material(), SESSION_ID, 3, 0, &[0u8; 23]),
            Err(MegolmError::InputTooShort { minimum: 24, actual: 23 })
        );
    }

    #[test]
    fn non_block_ciphertext_is_rejected_distinctly() {
        // 17 ciphertext bytes + 8 tag bytes: long enough, not a block
        // multiple.
        assert_eq!(
            decrypt(&key_material(), SESSION_ID, 3, 0, &[0u8; 25]),
            Err(MegolmError::BadPadding)
        );
    }

    #[test]
    fn short_session_id_is_rejected() {
        assert!(matches!(
            encrypt(&key_material(), b"short", 3, 0, b"payload"),
            Err(MegolmError::SessionIdTooShort { minimum: 32, actual: 5 })
        ));
    }

    #[test]
    fn session_id_changes_the_ciphertext() {
        let other_id: &[u8; 32] = b"another-session-identifier-32byt";
        let a = encrypt(&key_material(), SESSION_ID, 3, 0, b"payload").unwrap();
        let b = encrypt(&key_material(), other_id, 3, 0, b"payload").unwrap();
        assert_ne!(a, b);
    }
}
