//! Credential secret encryption.
//!
//! AES-256-CBC with PKCS#7 padding.
//! Key size: 32 bytes. IV: 16 bytes (random, fresh per encryption).
//!
//! Stored blob format:
//!   base64( IV (16 bytes) | ciphertext )
//!
//! CBC carries no authentication tag, so ciphertext malleability beyond a
//! padding failure goes undetected. Kept as-is for compatibility with the
//! stored blob format; a `CryptoError` from `decrypt_secret` means a wrong
//! key or corrupted/tampered data and should be logged at error severity.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::kdf::VaultKey;

/// AES block size — also the IV length.
pub const IV_LEN: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Encrypt a secret under the vault key, prepending a random 16-byte IV.
///
/// The IV comes from the OS CSPRNG on every call — never a counter, never
/// reused across encryptions, even for identical plaintext under the same
/// key. Two calls with equal inputs therefore produce different blobs.
pub fn encrypt_secret(plaintext: &str, key: &VaultKey) -> String {
    use rand::RngCore;
    let mut iv = [0u8; IV_LEN];
    rand::rngs::OsRng.fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new(&key.0.into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    // Prepend IV
    let mut blob = Vec::with_capacity(IV_LEN + ciphertext.len());
    blob.extend_from_slice(&iv);
    blob.extend_from_slice(&ciphertext);
    BASE64.encode(blob)
}

/// Decrypt a stored blob (base64 of IV || ciphertext).
///
/// Fails with a distinct error kind when the blob is not valid base64, is
/// shorter than the IV, or unpads incorrectly after decryption — the latter
/// signals a wrong key (wrong user / stale derivation) or corrupted data.
pub fn decrypt_secret(blob: &str, key: &VaultKey) -> Result<Zeroizing<String>, CryptoError> {
    let raw = BASE64.decode(blob)?;
    if raw.len() < IV_LEN {
        return Err(CryptoError::BlobTruncated(IV_LEN));
    }
    let (iv, ciphertext) = raw.split_at(IV_LEN);

    let padded = Aes256CbcDec::new(&key.0.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::InvalidPadding)?;

    String::from_utf8(padded)
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::InvalidPlaintext)
}
