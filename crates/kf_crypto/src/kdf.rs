//! Vault key derivation.
//!
//! `derive_key` — PBKDF2-HMAC-SHA256, derives the 32-byte key used to
//!   encrypt a user's stored secrets.
//!
//! The derivation input is the user's **stored password hash**, not the
//! plaintext password they typed. The vault key is therefore recoverable by
//! anyone who both passes the login check and can read the stored hash, and
//! it changes whenever the password hash changes — a password reset orphans
//! previously encrypted secrets unless they are re-encrypted first.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

/// PBKDF2 iteration count. Changing this invalidates every stored secret.
pub const KDF_ROUNDS: u32 = 100_000;

/// Derived key length — AES-256.
pub const KEY_LEN: usize = 32;

/// Per-user salt length. Generated once at registration, immutable after.
pub const SALT_LEN: usize = 16;

/// 32-byte vault key derived from the stored password hash. Zeroized on drop.
///
/// Lives for a single authenticated session; never persisted, never logged.
#[derive(ZeroizeOnDrop)]
pub struct VaultKey(pub [u8; KEY_LEN]);

/// Derive a vault key from the stored password hash + the user's salt.
///
/// Deterministic: the same `(password_hash, salt)` pair always yields the
/// same key, so a key derived fresh at login matches whatever key encrypted
/// the user's existing secrets.
pub fn derive_key(password_hash: &str, salt: &[u8; SALT_LEN]) -> VaultKey {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password_hash.as_bytes(), salt, KDF_ROUNDS, &mut key);
    VaultKey(key)
}

/// Generate a fresh random 16-byte salt (call once at registration; the salt
/// is stored alongside the user record and is not secret).
pub fn generate_salt() -> [u8; SALT_LEN] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let salt = generate_salt();
        let k1 = derive_key("$argon2id$stored-hash", &salt);
        let k2 = derive_key("$argon2id$stored-hash", &salt);
        assert_eq!(k1.0, k2.0);
    }

    #[test]
    fn different_salts_yield_different_keys() {
        let k1 = derive_key("$argon2id$stored-hash", &[0u8; SALT_LEN]);
        let k2 = derive_key("$argon2id$stored-hash", &[1u8; SALT_LEN]);
        assert_ne!(k1.0, k2.0);
    }

    #[test]
    fn different_hashes_yield_different_keys() {
        let salt = [7u8; SALT_LEN];
        let k1 = derive_key("hash-before-reset", &salt);
        let k2 = derive_key("hash-after-reset", &salt);
        assert_ne!(k1.0, k2.0);
    }

    #[test]
    fn generated_salts_are_unique() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
