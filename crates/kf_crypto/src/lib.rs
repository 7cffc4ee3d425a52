//! kf_crypto — Keyfold cryptographic primitives
//!
//! # Design principles
//! - NO custom crypto; all primitives come from audited Rust crates.
//! - Zeroize all secret material on drop.
//! - Public APIs take and return opaque newtypes to prevent accidental misuse.
//!
//! # Module layout
//! - `kdf`    — PBKDF2-HMAC-SHA256 vault key derivation + salt generation
//! - `cipher` — AES-256-CBC secret encrypt/decrypt (base64 IV‖ciphertext blobs)
//! - `error`  — unified error type

pub mod cipher;
pub mod error;
pub mod kdf;

pub use cipher::{decrypt_secret, encrypt_secret};
pub use error::CryptoError;
pub use kdf::{derive_key, generate_salt, VaultKey};
