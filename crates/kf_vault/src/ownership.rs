//! Ownership authorization.
//!
//! Every credential has exactly one authorizing owner: the user it hangs
//! off directly, or the owner of the folder it lives in. The guard checks
//! whichever path is populated — never both, by the data-model invariant.
//! Pure decisions over already-loaded rows; callers load the rows and apply
//! the no-partial-side-effect rule (deny before any mutation).

use tracing::warn;

use kf_store::models::{CredentialRow, FolderRow, UserRow};

/// The operation being authorized. The decision does not depend on it — all
/// four require the same owner — but denials are logged with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Create,
    Read,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allowed
    }
}

/// Authorize `actor` to perform `op` on `credential`.
///
/// `folder` must be the credential's folder row when `folder_id` is set
/// (the caller resolves it); it is ignored for directly-owned credentials.
pub fn authorize_credential(
    actor: &UserRow,
    credential: &CredentialRow,
    folder: Option<&FolderRow>,
    op: Op,
) -> Decision {
    let allowed = match (credential.user_id.as_deref(), credential.folder_id.as_deref()) {
        (Some(user_id), None) => user_id == actor.id,
        (None, Some(folder_id)) => {
            folder.is_some_and(|f| f.id == folder_id && f.user_id == actor.id)
        }
        // Unreachable for rows that honor the exclusivity constraints.
        _ => false,
    };
    if allowed {
        Decision::Allowed
    } else {
        warn!(
            "[guard] denied {:?} on credential {} for user {}",
            op, credential.id, actor.id
        );
        Decision::Denied
    }
}

/// Authorize `actor` to perform `op` on `folder`: allowed iff they own it.
pub fn authorize_folder(actor: &UserRow, folder: &FolderRow, op: Op) -> Decision {
    if folder.user_id == actor.id {
        Decision::Allowed
    } else {
        warn!(
            "[guard] denied {:?} on folder {} for user {}",
            op, folder.id, actor.id
        );
        Decision::Denied
    }
}
