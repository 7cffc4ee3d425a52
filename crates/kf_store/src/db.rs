//! Database abstraction over SQLite via sqlx.

use std::path::Path;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{CredentialRow, FolderRow, UserRow};
use crate::owner::CredentialOwner;

/// Central store handle. Cheap to clone (the pool is an Arc internally).
///
/// The store never holds or derives a vault key; secrets arrive and leave
/// this layer as opaque ciphertext blobs.
#[derive(Clone)]
pub struct Store {
    pub pool: SqlitePool,
}

impl Store {
    /// Open (or create) the SQLite database at `db_path`.
    /// Runs all pending migrations automatically.
    ///
    /// WAL journal mode and foreign-key enforcement are configured at
    /// connection time here — NOT inside a migration, because SQLite forbids
    /// changing `journal_mode` inside a transaction and sqlx wraps every
    /// migration in one. Foreign keys must be on for the ownership cascades
    /// (user → folders → credentials) to fire.
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(opts).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        info!("[store] opened database at {}", db_path.display());
        Ok(Self { pool })
    }

    // ── Users ────────────────────────────────────────────────────────────────

    /// Insert a new user. `vault_salt` is the hex-encoded per-user salt,
    /// generated once here at registration and immutable afterwards.
    pub async fn insert_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        vault_salt: &str,
    ) -> Result<UserRow, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, failed_attempts, vault_salt, created_at)
             VALUES (?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(&id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(vault_salt)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.user_by_id(&id)
            .await?
            .ok_or(StoreError::NotFound("user"))
    }

    pub async fn user_by_id(&self, id: &str) -> Result<Option<UserRow>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Case-insensitive username lookup (the column is COLLATE NOCASE).
    pub async fn user_by_username(&self, username: &str) -> Result<Option<UserRow>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Whether `username` is taken by any user other than `exclude_id`.
    pub async fn username_taken(
        &self,
        username: &str,
        exclude_id: Option<&str>,
    ) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE username = ? AND id != COALESCE(?, '')",
        )
        .bind(username)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Record a failed login. A single relative UPDATE so concurrent
    /// attempts against the same row cannot lose counts.
    pub async fn bump_failed_attempts(&self, user_id: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET failed_attempts = failed_attempts + 1 WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Reset the counter after a successful login (or an external unlock).
    pub async fn reset_failed_attempts(&self, user_id: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET failed_attempts = 0 WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_user_profile(
        &self,
        user_id: &str,
        username: &str,
        email: &str,
    ) -> Result<(), StoreError> {
        let res = sqlx::query("UPDATE users SET username = ?, email = ? WHERE id = ?")
            .bind(username)
            .bind(email)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound("user"));
        }
        Ok(())
    }

    /// Delete a user. Folders and credentials cascade at the schema level.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound("user"));
        }
        Ok(())
    }

    /// Credentials reachable from `user_id`: direct plus inside owned folders.
    pub async fn count_user_credentials(&self, user_id: &str) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM credentials c
             LEFT JOIN folders f ON c.folder_id = f.id
             WHERE c.user_id = ? OR f.user_id = ?",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn count_user_folders(&self, user_id: &str) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM folders WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // ── Folders ──────────────────────────────────────────────────────────────

    pub async fn insert_folder(&self, user_id: &str, name: &str) -> Result<FolderRow, StoreError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO folders (id, name, user_id, created_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(name)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        self.folder_by_id(&id)
            .await?
            .ok_or(StoreError::NotFound("folder"))
    }

    pub async fn folder_by_id(&self, id: &str) -> Result<Option<FolderRow>, StoreError> {
        let row = sqlx::query_as::<_, FolderRow>("SELECT * FROM folders WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list_folders(&self, user_id: &str) -> Result<Vec<FolderRow>, StoreError> {
        let rows = sqlx::query_as::<_, FolderRow>(
            "SELECT * FROM folders WHERE user_id = ? ORDER BY created_at, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn rename_folder(&self, folder_id: &str, name: &str) -> Result<(), StoreError> {
        let res = sqlx::query("UPDATE folders SET name = ? WHERE id = ?")
            .bind(name)
            .bind(folder_id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound("folder"));
        }
        Ok(())
    }

    /// Delete a folder. Its credentials cascade at the schema level, not in
    /// an application loop.
    pub async fn delete_folder(&self, folder_id: &str) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM folders WHERE id = ?")
            .bind(folder_id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound("folder"));
        }
        Ok(())
    }

    pub async fn count_folder_credentials(&self, folder_id: &str) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM credentials WHERE folder_id = ?")
            .bind(folder_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // ── Credentials ──────────────────────────────────────────────────────────

    /// Insert a credential. `CredentialOwner` guarantees exactly one owner
    /// column is populated; the schema CHECKs would reject anything else.
    pub async fn insert_credential(
        &self,
        name: &str,
        login: &str,
        secret_enc: &str,
        owner: &CredentialOwner,
    ) -> Result<CredentialRow, StoreError> {
        let id = Uuid::new_v4().to_string();
        let (user_id, folder_id) = owner.as_columns();
        sqlx::query(
            "INSERT INTO credentials (id, name, login, secret_enc, user_id, folder_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(name)
        .bind(login)
        .bind(secret_enc)
        .bind(user_id)
        .bind(folder_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.credential_by_id(&id)
            .await?
            .ok_or(StoreError::NotFound("credential"))
    }

    pub async fn credential_by_id(&self, id: &str) -> Result<Option<CredentialRow>, StoreError> {
        let row = sqlx::query_as::<_, CredentialRow>("SELECT * FROM credentials WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// All credentials reachable from `user_id`: owned directly plus those
    /// inside folders the user owns. Secrets stay encrypted.
    pub async fn list_credentials(&self, user_id: &str) -> Result<Vec<CredentialRow>, StoreError> {
        let rows = sqlx::query_as::<_, CredentialRow>(
            "SELECT c.* FROM credentials c
             LEFT JOIN folders f ON c.folder_id = f.id
             WHERE c.user_id = ? OR f.user_id = ?
             ORDER BY c.created_at, c.id",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn update_credential(
        &self,
        credential_id: &str,
        name: &str,
        login: &str,
        secret_enc: &str,
    ) -> Result<(), StoreError> {
        let res = sqlx::query(
            "UPDATE credentials SET name = ?, login = ?, secret_enc = ? WHERE id = ?",
        )
        .bind(name)
        .bind(login)
        .bind(secret_enc)
        .bind(credential_id)
        .execute(&self.pool)
        .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound("credential"));
        }
        Ok(())
    }

    pub async fn delete_credential(&self, credential_id: &str) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM credentials WHERE id = ?")
            .bind(credential_id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound("credential"));
        }
        Ok(())
    }
}
