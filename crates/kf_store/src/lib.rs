//! kf_store — SQLite persistence for the Keyfold credential vault
//!
//! # Encryption strategy
//! SQLite does NOT natively encrypt. We use application-level encryption:
//! - Credential secrets are stored as AES-256-CBC ciphertext, base64-encoded
//!   (`kf_crypto::cipher`), under a key the *caller* derives at login.
//! - The store itself never sees a vault key: encrypt/decrypt happen above
//!   this layer, so a compromised store handle cannot leak plaintext.
//! - Non-sensitive metadata (names, logins, timestamps, owner ids) is stored
//!   in plaintext to allow efficient queries.
//!
//! # Migration
//! SQLx migrations in `migrations/` are run on open.

pub mod db;
pub mod error;
pub mod models;
pub mod owner;

pub use db::Store;
pub use error::StoreError;
pub use owner::CredentialOwner;
