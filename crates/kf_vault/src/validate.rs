//! Field validation.
//!
//! Length caps match the storage schema (names/logins 100, folder names 50)
//! and the secret-length policy (50 plaintext chars, so the encrypted blob
//! stays inside the 250-char column).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, VaultError};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_LOGIN_LEN: usize = 100;
pub const MAX_SECRET_LEN: usize = 50;
/// Byte ceiling for the secret. The char cap alone would let a 50-char
/// multibyte secret reach ~200 bytes and overflow the 250-char column once
/// padded and base64-encoded; 159 is the largest plaintext byte length whose
/// PKCS#7-padded ciphertext plus IV still encodes within it.
pub const MAX_SECRET_BYTES: usize = 159;
pub const MAX_FOLDER_NAME_LEN: usize = 50;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("static regex is valid")
});

fn fail(msg: impl Into<String>) -> VaultError {
    VaultError::Validation(msg.into())
}

pub fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if len < 3 {
        return Err(fail("Username must be 3 characters or greater"));
    }
    if len > 25 {
        return Err(fail("Username cannot be greater than 25 characters"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<()> {
    if !EMAIL_RE.is_match(email) {
        return Err(fail("Email invalid"));
    }
    Ok(())
}

/// Master password policy: at least 8 chars, one capital, and one digit or
/// special character.
pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < 8 {
        return Err(fail("Passwords must be 8 characters long"));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(fail("Passwords must have 1 capital letter"));
    }
    if !password.chars().any(|c| c.is_ascii_digit() || !c.is_alphanumeric()) {
        return Err(fail("Passwords must contain one special character or number"));
    }
    Ok(())
}

pub fn validate_credential_fields(name: &str, login: &str, secret: &str) -> Result<()> {
    if name.is_empty() || login.is_empty() || secret.is_empty() {
        return Err(fail("All fields are required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(fail(format!("Account name must be {MAX_NAME_LEN} characters or below")));
    }
    if login.chars().count() > MAX_LOGIN_LEN {
        return Err(fail(format!("Login must be {MAX_LOGIN_LEN} characters or below")));
    }
    if secret.chars().count() > MAX_SECRET_LEN {
        return Err(fail(format!("Password must be {MAX_SECRET_LEN} characters or below")));
    }
    if secret.len() > MAX_SECRET_BYTES {
        return Err(fail(format!("Password must be {MAX_SECRET_BYTES} bytes or below")));
    }
    Ok(())
}

pub fn validate_folder_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(fail("Folder name required"));
    }
    if name.chars().count() > MAX_FOLDER_NAME_LEN {
        return Err(fail(format!(
            "Folder name must be {MAX_FOLDER_NAME_LEN} characters or below"
        )));
    }
    Ok(())
}
