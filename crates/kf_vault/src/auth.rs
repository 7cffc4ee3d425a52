//! AuthGate: registration, login, and the lockout state machine.
//!
//! Per-user states: {Active, Locked}. A wrong password while
//! `failed_attempts < 5` increments the counter and stays Active; at 5 the
//! account is Locked and every further attempt — correct password included —
//! fails `AccountLocked`. There is no automatic unlock; an external reset
//! (`Store::reset_failed_attempts`) is the only way back.
//!
//! A successful login resets the counter and produces the vault key as the
//! operation's return value. The key is derived from the *stored password
//! hash* plus the per-user salt, is never persisted, and zeroizes on drop.
//! Session/token issuance is the caller's concern, invoked after this gate.

use tracing::{info, warn};

use kf_crypto::kdf::{derive_key, generate_salt, VaultKey};
use kf_store::models::UserRow;
use kf_store::Store;

use crate::error::{Result, VaultError};
use crate::validate;

/// Password hashing as an injected capability, so the gate is testable
/// without paying Argon2 cost and never depends on an ambient singleton.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing stored string.
    fn hash(&self, password: &str) -> Result<String>;

    /// Constant-time verification of `password` against a stored hash.
    /// Malformed stored hashes verify as false, never panic.
    fn verify(&self, password: &str, stored_hash: &str) -> bool;
}

/// Production hasher: Argon2id with default parameters, PHC-string output.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String> {
        use argon2::password_hash::{rand_core::OsRng, SaltString};
        use argon2::PasswordHasher as _;

        let salt = SaltString::generate(&mut OsRng);
        argon2::Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| VaultError::Validation(format!("Password hashing failed: {e}")))
    }

    fn verify(&self, password: &str, stored_hash: &str) -> bool {
        use argon2::password_hash::PasswordHash;
        use argon2::PasswordVerifier as _;

        match PasswordHash::new(stored_hash) {
            Ok(parsed) => argon2::Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

/// A successful login: the authenticated user plus the derived vault key.
/// The key lives for this session only — callers must not persist or log it.
pub struct LoginOutcome {
    pub user: UserRow,
    pub key: VaultKey,
}

/// Account profile summary (counts span direct and folder credentials).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Profile {
    pub username: String,
    pub email: String,
    pub folder_count: i64,
    pub credential_count: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub struct AuthGate<H: PasswordHasher> {
    store: Store,
    hasher: H,
}

impl<H: PasswordHasher> AuthGate<H> {
    pub fn new(store: Store, hasher: H) -> Self {
        Self { store, hasher }
    }

    /// Register a new account: validate, hash the password, generate the
    /// per-user salt (once, immutable thereafter), insert.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<UserRow> {
        validate::validate_username(username)?;
        validate::validate_email(email)?;
        validate::validate_password(password)?;
        if password != password_confirm {
            return Err(VaultError::Validation("Passwords must match".into()));
        }
        if self.store.username_taken(username, None).await? {
            return Err(VaultError::Validation("Username is already in use".into()));
        }

        let password_hash = self.hasher.hash(password)?;
        let salt = hex::encode(generate_salt());
        let user = self
            .store
            .insert_user(username, email, &password_hash, &salt)
            .await?;
        info!("[auth] registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Attempt a login. Order matters:
    /// 1. unknown username → `BadCredentials` (same kind as a wrong
    ///    password, so usernames cannot be probed)
    /// 2. locked account → `AccountLocked`, password never checked
    /// 3. wrong password → bump the counter, `BadCredentials`
    /// 4. correct password → reset the counter, derive and return the key
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let Some(user) = self.store.user_by_username(username).await? else {
            warn!("[auth] login failed: unknown username");
            return Err(VaultError::BadCredentials);
        };

        if user.is_locked() {
            warn!("[auth] login rejected for locked account {}", user.id);
            return Err(VaultError::AccountLocked);
        }

        if !self.hasher.verify(password, &user.password_hash) {
            self.store.bump_failed_attempts(&user.id).await?;
            warn!(
                "[auth] login failed for user {} (attempt {})",
                user.id,
                user.failed_attempts + 1
            );
            return Err(VaultError::BadCredentials);
        }

        self.store.reset_failed_attempts(&user.id).await?;
        let key = derive_key(&user.password_hash, &user.salt()?);
        info!("[auth] user {} logged in", user.id);

        let user = UserRow {
            failed_attempts: 0,
            ..user
        };
        Ok(LoginOutcome { user, key })
    }

    /// Update username/email. Uniqueness is checked case-insensitively,
    /// excluding the user's own row so re-casing your own name is allowed.
    pub async fn update_profile(&self, user: &UserRow, username: &str, email: &str) -> Result<()> {
        validate::validate_username(username)?;
        validate::validate_email(email)?;
        if self.store.username_taken(username, Some(&user.id)).await? {
            return Err(VaultError::Validation("Username is already in use".into()));
        }
        self.store
            .update_user_profile(&user.id, username, email)
            .await?;
        info!("[auth] user {} updated profile", user.id);
        Ok(())
    }

    pub async fn profile(&self, user: &UserRow) -> Result<Profile> {
        Ok(Profile {
            username: user.username.clone(),
            email: user.email.clone(),
            folder_count: self.store.count_user_folders(&user.id).await?,
            credential_count: self.store.count_user_credentials(&user.id).await?,
            created_at: user.created_at,
        })
    }
}
