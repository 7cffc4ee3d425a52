//! kf_vault — Keyfold service layer
//!
//! Composes `kf_crypto` and `kf_store` into the credential vault proper:
//!
//! - `auth`      — registration, login, lockout state machine, derived-key
//!                 production (AuthGate)
//! - `ownership` — the exclusive-ownership authorization rules (OwnershipGuard)
//! - `service`   — credential and folder lifecycle (VaultService)
//! - `validate`  — field validation shared by the above
//! - `error`     — unified error taxonomy
//!
//! The server side never decrypts: `VaultService` stores and returns
//! ciphertext blobs, and only the caller-held key derived at login ever
//! sees plaintext. Everything here takes its collaborators (store handle,
//! password hasher) explicitly — no ambient globals.

pub mod auth;
pub mod error;
pub mod ownership;
pub mod service;
pub mod validate;

pub use auth::{Argon2Hasher, AuthGate, LoginOutcome, PasswordHasher};
pub use error::{Result, VaultError};
pub use ownership::{authorize_credential, authorize_folder, Decision, Op};
pub use service::{CredentialUpdate, NewCredential, VaultService};
