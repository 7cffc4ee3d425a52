//! Vault error taxonomy.
//!
//! `NotFound` and `NotOwned` are deliberately distinct kinds so callers can
//! decide whether to unify them at the presentation layer; the one place the
//! core unifies them itself is create-into-folder, where an unresolved
//! folder id reports `NotOwned` so folder ids cannot be probed.

use thiserror::Error;

use kf_crypto::CryptoError;
use kf_store::StoreError;

pub type Result<T> = std::result::Result<T, VaultError>;

#[derive(Debug, Error)]
pub enum VaultError {
    /// Bad input shape or length — recoverable, user-correctable.
    #[error("{0}")]
    Validation(String),

    /// Referenced credential/folder id does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Ownership check failed.
    #[error("You are not the owner of this item")]
    NotOwned,

    /// Failed-attempt threshold exceeded; rejected before the password is
    /// even checked. No unlock path in the core.
    #[error("Account locked")]
    AccountLocked,

    /// Unknown username or wrong password — one kind, one message, so login
    /// does not oracle which usernames exist.
    #[error("Username or password is incorrect")]
    BadCredentials,

    /// Wrong key or corrupted/tampered ciphertext. Should never occur under
    /// correct operation; callers log this at error severity.
    #[error("Decryption failed: {0}")]
    Decryption(#[from] CryptoError),

    /// Persistence failure.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}
