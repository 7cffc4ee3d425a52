//! Credential ownership as a type.
//!
//! Exactly one of {owning user, owning folder} holds a credential. The
//! schema enforces this with CHECK constraints; this enum makes the
//! both-set and neither-set states unrepresentable at the insert API, so a
//! caller cannot even attempt to persist an invalid row.

/// The single authorizing owner of a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialOwner {
    /// Attached directly to a user's top level.
    User(String),
    /// Attached to a folder (whose owning user authorizes access).
    Folder(String),
}

impl CredentialOwner {
    /// Split into the nullable `(user_id, folder_id)` column pair.
    pub fn as_columns(&self) -> (Option<&str>, Option<&str>) {
        match self {
            CredentialOwner::User(id) => (Some(id.as_str()), None),
            CredentialOwner::Folder(id) => (None, Some(id.as_str())),
        }
    }
}
