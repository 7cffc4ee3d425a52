//! Database row models — these map to/from SQL rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kf_crypto::kdf::SALT_LEN;

use crate::error::StoreError;

/// Number of consecutive failed logins after which an account is locked.
pub const LOCKOUT_THRESHOLD: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    /// Unique case-insensitively (COLLATE NOCASE in the schema).
    pub username: String,
    pub email: String,
    /// Argon2id PHC string — also the KDF input for the vault key.
    pub password_hash: String,
    pub failed_attempts: i64,
    /// Hex-encoded 16-byte salt for vault key derivation
    pub vault_salt: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Decode the stored per-user salt.
    pub fn salt(&self) -> Result<[u8; SALT_LEN], StoreError> {
        let bytes =
            hex::decode(&self.vault_salt).map_err(|e| StoreError::MalformedSalt(e.to_string()))?;
        bytes
            .try_into()
            .map_err(|_| StoreError::MalformedSalt(format!("expected {SALT_LEN} bytes")))
    }

    pub fn is_locked(&self) -> bool {
        self.failed_attempts >= LOCKOUT_THRESHOLD
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FolderRow {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CredentialRow {
    pub id: String,
    pub name: String,
    pub login: String,
    /// base64(IV || AES-256-CBC ciphertext) — opaque to the store.
    pub secret_enc: String,
    /// Set iff the credential hangs directly off a user.
    pub user_id: Option<String>,
    /// Set iff the credential lives in a folder.
    pub folder_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
