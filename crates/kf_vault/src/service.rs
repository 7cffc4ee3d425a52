//! VaultService: the credential and folder lifecycle.
//!
//! Every operation is authorize-then-mutate: validation and the ownership
//! check run before any write, so a denial leaves persisted state untouched.
//! The vault key arrives from the caller's authenticated session (produced
//! once by `AuthGate::login`) — it is never re-derived here and never stored.
//! Listing returns ciphertext: decryption is the key-holding client's job.

use tracing::info;

use kf_crypto::cipher::encrypt_secret;
use kf_crypto::kdf::VaultKey;
use kf_store::models::{CredentialRow, FolderRow, UserRow};
use kf_store::{CredentialOwner, Store};

use crate::error::{Result, VaultError};
use crate::ownership::{authorize_credential, authorize_folder, Op};
use crate::validate;

/// Fields for a new credential. `folder_id = None` attaches it directly to
/// the acting user; `Some` requires the folder to exist and be theirs.
#[derive(Debug, Clone)]
pub struct NewCredential<'a> {
    pub name: &'a str,
    pub login: &'a str,
    /// Plaintext secret, ≤50 chars by policy. Encrypted before persistence.
    pub secret: &'a str,
    pub folder_id: Option<&'a str>,
}

/// Replacement fields for an existing credential. The secret is always
/// re-encrypted under the caller's key.
#[derive(Debug, Clone)]
pub struct CredentialUpdate<'a> {
    pub name: &'a str,
    pub login: &'a str,
    pub secret: &'a str,
}

pub struct VaultService {
    store: Store,
}

impl VaultService {
    /// The store handle is injected — the service owns no ambient state.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    // ── Credentials ──────────────────────────────────────────────────────────

    pub async fn create_credential(
        &self,
        actor: &UserRow,
        key: &VaultKey,
        input: NewCredential<'_>,
    ) -> Result<CredentialRow> {
        validate::validate_credential_fields(input.name, input.login, input.secret)?;

        // Resolve the owner before touching anything. A folder id that does
        // not resolve to a folder owned by the actor is NotOwned — not
        // NotFound — so folder ids of other users cannot be probed.
        let owner = match input.folder_id {
            Some(folder_id) => match self.store.folder_by_id(folder_id).await? {
                Some(folder) if authorize_folder(actor, &folder, Op::Create).is_allowed() => {
                    CredentialOwner::Folder(folder.id)
                }
                _ => return Err(VaultError::NotOwned),
            },
            None => CredentialOwner::User(actor.id.clone()),
        };

        let secret_enc = encrypt_secret(input.secret, key);
        let credential = self
            .store
            .insert_credential(input.name, input.login, &secret_enc, &owner)
            .await?;
        info!("[vault] user {} created credential {}", actor.id, credential.id);
        Ok(credential)
    }

    /// All credentials the actor owns, directly or through their folders.
    /// Secrets come back still encrypted; only the client-held key derived
    /// at login ever sees plaintext.
    pub async fn list_credentials(&self, actor: &UserRow) -> Result<Vec<CredentialRow>> {
        Ok(self.store.list_credentials(&actor.id).await?)
    }

    pub async fn update_credential(
        &self,
        actor: &UserRow,
        key: &VaultKey,
        credential_id: &str,
        update: CredentialUpdate<'_>,
    ) -> Result<CredentialRow> {
        validate::validate_credential_fields(update.name, update.login, update.secret)?;

        let credential = self.load_authorized(actor, credential_id, Op::Update).await?;

        let secret_enc = encrypt_secret(update.secret, key);
        self.store
            .update_credential(&credential.id, update.name, update.login, &secret_enc)
            .await?;
        info!("[vault] user {} updated credential {}", actor.id, credential.id);

        self.store
            .credential_by_id(&credential.id)
            .await?
            .ok_or(VaultError::NotFound("credential"))
    }

    pub async fn delete_credential(&self, actor: &UserRow, credential_id: &str) -> Result<()> {
        let credential = self.load_authorized(actor, credential_id, Op::Delete).await?;
        self.store.delete_credential(&credential.id).await?;
        info!("[vault] user {} deleted credential {}", actor.id, credential.id);
        Ok(())
    }

    /// Load a credential and run the ownership guard against `actor`,
    /// resolving the folder row when the folder path is the populated one.
    async fn load_authorized(
        &self,
        actor: &UserRow,
        credential_id: &str,
        op: Op,
    ) -> Result<CredentialRow> {
        let credential = self
            .store
            .credential_by_id(credential_id)
            .await?
            .ok_or(VaultError::NotFound("credential"))?;

        let folder = match credential.folder_id.as_deref() {
            Some(folder_id) => self.store.folder_by_id(folder_id).await?,
            None => None,
        };

        if !authorize_credential(actor, &credential, folder.as_ref(), op).is_allowed() {
            return Err(VaultError::NotOwned);
        }
        Ok(credential)
    }

    // ── Folders ──────────────────────────────────────────────────────────────

    pub async fn create_folder(&self, actor: &UserRow, name: &str) -> Result<FolderRow> {
        validate::validate_folder_name(name)?;
        let folder = self.store.insert_folder(&actor.id, name).await?;
        info!("[vault] user {} created folder {}", actor.id, folder.id);
        Ok(folder)
    }

    pub async fn list_folders(&self, actor: &UserRow) -> Result<Vec<FolderRow>> {
        Ok(self.store.list_folders(&actor.id).await?)
    }

    pub async fn rename_folder(&self, actor: &UserRow, folder_id: &str, name: &str) -> Result<()> {
        validate::validate_folder_name(name)?;
        let folder = self
            .store
            .folder_by_id(folder_id)
            .await?
            .ok_or(VaultError::NotFound("folder"))?;
        if !authorize_folder(actor, &folder, Op::Update).is_allowed() {
            return Err(VaultError::NotOwned);
        }
        self.store.rename_folder(&folder.id, name).await?;
        info!("[vault] user {} renamed folder {}", actor.id, folder.id);
        Ok(())
    }

    /// Delete a folder. Its credentials go with it via the schema-level
    /// cascade, not an application loop.
    pub async fn delete_folder(&self, actor: &UserRow, folder_id: &str) -> Result<()> {
        let folder = self
            .store
            .folder_by_id(folder_id)
            .await?
            .ok_or(VaultError::NotFound("folder"))?;
        if !authorize_folder(actor, &folder, Op::Delete).is_allowed() {
            return Err(VaultError::NotOwned);
        }
        self.store.delete_folder(&folder.id).await?;
        info!("[vault] user {} deleted folder {}", actor.id, folder.id);
        Ok(())
    }
}
