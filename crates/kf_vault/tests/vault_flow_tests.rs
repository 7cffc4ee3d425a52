//! Integration tests for the vault service layer.
//!
//! Tests cover:
//!  1. Register → login → create → list → client-side decrypt
//!  2. Cross-user denial (ciphertext untouched)
//!  3. Folder ownership paths (allowed / denied / unresolved)
//!  4. Lockout state machine
//!  5. Registration validation
//!  6. Folder lifecycle + cascade
//!  7. Profile counts
//!  8. Profile update (uniqueness excludes own row)

use std::path::PathBuf;
use uuid::Uuid;

use kf_crypto::cipher::decrypt_secret;
use kf_store::Store;
use kf_vault::{
    Argon2Hasher, AuthGate, CredentialUpdate, NewCredential, PasswordHasher, VaultError,
    VaultService,
};

/// Test hasher: stores the password as-is. Keeps lockout-machine tests from
/// paying Argon2 cost; the real hasher is exercised in the end-to-end test.
struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> kf_vault::Result<String> {
        Ok(format!("plain${password}"))
    }
    fn verify(&self, password: &str, stored_hash: &str) -> bool {
        stored_hash == format!("plain${password}")
    }
}

async fn open_test_store() -> Store {
    let db_path = PathBuf::from(format!(
        "{}/kf-vault-test-{}.db",
        std::env::temp_dir().display(),
        Uuid::new_v4()
    ));
    Store::open(&db_path).await.expect("open store")
}

async fn setup() -> (AuthGate<PlainHasher>, VaultService, Store) {
    let store = open_test_store().await;
    (
        AuthGate::new(store.clone(), PlainHasher),
        VaultService::new(store.clone()),
        store,
    )
}

// ─── Test 1: end-to-end with the real hasher ────────────────────────────────

#[tokio::test]
async fn register_login_store_and_decrypt_round_trip() {
    let store = open_test_store().await;
    let gate = AuthGate::new(store.clone(), Argon2Hasher);
    let vault = VaultService::new(store);

    gate.register("alice", "alice@example.com", "Hunter2!pw", "Hunter2!pw")
        .await
        .expect("register");
    let session = gate.login("alice", "Hunter2!pw").await.expect("login");

    vault
        .create_credential(
            &session.user,
            &session.key,
            NewCredential {
                name: "github",
                login: "alice",
                secret: "hunter2!",
                folder_id: None,
            },
        )
        .await
        .expect("create credential");

    // The server hands back ciphertext, never the secret.
    let listed = vault.list_credentials(&session.user).await.expect("list");
    assert_eq!(listed.len(), 1);
    let blob = &listed[0].secret_enc;
    assert_ne!(blob, "hunter2!");
    assert!(blob.len() <= 250);

    // A later session derives the same key and can decrypt client-side.
    let session2 = gate.login("alice", "Hunter2!pw").await.expect("re-login");
    let plain = decrypt_secret(blob, &session2.key).expect("decrypt");
    assert_eq!(plain.as_str(), "hunter2!");
}

// ─── Test 2: cross-user denial leaves state untouched ───────────────────────

#[tokio::test]
async fn foreign_update_is_denied_and_ciphertext_unchanged() {
    let (gate, vault, _store) = setup().await;

    gate.register("alice", "a@example.com", "Hunter2!pw", "Hunter2!pw")
        .await
        .unwrap();
    gate.register("bob", "b@example.com", "Hunter2!pw", "Hunter2!pw")
        .await
        .unwrap();
    let alice = gate.login("alice", "Hunter2!pw").await.unwrap();
    let bob = gate.login("bob", "Hunter2!pw").await.unwrap();

    let cred = vault
        .create_credential(
            &alice.user,
            &alice.key,
            NewCredential {
                name: "github",
                login: "alice",
                secret: "hunter2!",
                folder_id: None,
            },
        )
        .await
        .unwrap();

    let update = CredentialUpdate {
        name: "hijacked",
        login: "bob",
        secret: "gotcha",
    };
    let denied = vault
        .update_credential(&bob.user, &bob.key, &cred.id, update)
        .await;
    assert!(matches!(denied, Err(VaultError::NotOwned)));

    let after = vault.list_credentials(&alice.user).await.unwrap();
    assert_eq!(after[0].secret_enc, cred.secret_enc);
    assert_eq!(after[0].name, "github");

    let also_denied = vault.delete_credential(&bob.user, &cred.id).await;
    assert!(matches!(also_denied, Err(VaultError::NotOwned)));
    assert_eq!(vault.list_credentials(&alice.user).await.unwrap().len(), 1);
}

// ─── Test 3: folder ownership paths ─────────────────────────────────────────

#[tokio::test]
async fn folder_credentials_authorize_via_folder_owner() {
    let (gate, vault, _store) = setup().await;

    gate.register("alice", "a@example.com", "Hunter2!pw", "Hunter2!pw")
        .await
        .unwrap();
    gate.register("bob", "b@example.com", "Hunter2!pw", "Hunter2!pw")
        .await
        .unwrap();
    let alice = gate.login("alice", "Hunter2!pw").await.unwrap();
    let bob = gate.login("bob", "Hunter2!pw").await.unwrap();

    let folder = vault.create_folder(&alice.user, "Work").await.unwrap();
    let cred = vault
        .create_credential(
            &alice.user,
            &alice.key,
            NewCredential {
                name: "jira",
                login: "alice",
                secret: "in-folder",
                folder_id: Some(&folder.id),
            },
        )
        .await
        .unwrap();
    assert_eq!(cred.folder_id.as_deref(), Some(folder.id.as_str()));
    assert_eq!(cred.user_id, None);

    // The folder's owner may mutate; anyone else may not.
    vault
        .update_credential(
            &alice.user,
            &alice.key,
            &cred.id,
            CredentialUpdate {
                name: "jira",
                login: "alice",
                secret: "rotated",
            },
        )
        .await
        .expect("owner update via folder path");
    let denied = vault.delete_credential(&bob.user, &cred.id).await;
    assert!(matches!(denied, Err(VaultError::NotOwned)));

    // Creating into someone else's folder, or a folder that does not exist,
    // is NotOwned either way.
    for folder_id in [folder.id.as_str(), "no-such-folder"] {
        let res = vault
            .create_credential(
                &bob.user,
                &bob.key,
                NewCredential {
                    name: "sneaky",
                    login: "bob",
                    secret: "x",
                    folder_id: Some(folder_id),
                },
            )
            .await;
        assert!(matches!(res, Err(VaultError::NotOwned)));
    }
    assert_eq!(vault.list_credentials(&bob.user).await.unwrap().len(), 0);
}

// ─── Test 4: lockout state machine ──────────────────────────────────────────

#[tokio::test]
async fn five_failures_lock_the_account_permanently() {
    let (gate, _vault, store) = setup().await;

    let user = gate
        .register("alice", "a@example.com", "Hunter2!pw", "Hunter2!pw")
        .await
        .unwrap();

    for attempt in 1..=4 {
        let res = gate.login("alice", "wrong-password").await;
        assert!(matches!(res, Err(VaultError::BadCredentials)));
        let row = store.user_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(row.failed_attempts, attempt);
        assert!(!row.is_locked());
    }

    // Fifth failure crosses the threshold.
    let res = gate.login("alice", "wrong-password").await;
    assert!(matches!(res, Err(VaultError::BadCredentials)));
    assert!(store.user_by_id(&user.id).await.unwrap().unwrap().is_locked());

    // Locked means locked — even for the correct password.
    let res = gate.login("alice", "Hunter2!pw").await;
    assert!(matches!(res, Err(VaultError::AccountLocked)));
    let row = store.user_by_id(&user.id).await.unwrap().unwrap();
    assert_eq!(row.failed_attempts, 5);
}

#[tokio::test]
async fn correct_password_below_threshold_resets_counter() {
    let (gate, _vault, store) = setup().await;

    let user = gate
        .register("alice", "a@example.com", "Hunter2!pw", "Hunter2!pw")
        .await
        .unwrap();

    for _ in 0..4 {
        let _ = gate.login("alice", "nope").await;
    }
    assert_eq!(
        store.user_by_id(&user.id).await.unwrap().unwrap().failed_attempts,
        4
    );

    let session = gate.login("alice", "Hunter2!pw").await.expect("login");
    assert_eq!(session.user.failed_attempts, 0);
    assert_eq!(
        store.user_by_id(&user.id).await.unwrap().unwrap().failed_attempts,
        0
    );
}

#[tokio::test]
async fn unknown_user_and_wrong_password_are_indistinguishable() {
    let (gate, _vault, _store) = setup().await;

    gate.register("alice", "a@example.com", "Hunter2!pw", "Hunter2!pw")
        .await
        .unwrap();

    let unknown = gate.login("mallory", "Hunter2!pw").await;
    let wrong = gate.login("alice", "wrong").await;
    assert!(matches!(unknown, Err(VaultError::BadCredentials)));
    assert!(matches!(wrong, Err(VaultError::BadCredentials)));
}

// ─── Test 5: registration validation ────────────────────────────────────────

#[tokio::test]
async fn registration_enforces_field_rules() {
    let (gate, _vault, _store) = setup().await;

    gate.register("alice", "a@example.com", "Hunter2!pw", "Hunter2!pw")
        .await
        .unwrap();

    // Duplicate username, case-insensitively.
    let dup = gate
        .register("ALICE", "other@example.com", "Hunter2!pw", "Hunter2!pw")
        .await;
    assert!(matches!(dup, Err(VaultError::Validation(_))));

    let cases = [
        ("al", "a@example.com", "Hunter2!pw", "Hunter2!pw"), // short username
        ("carol", "not-an-email", "Hunter2!pw", "Hunter2!pw"), // bad email
        ("carol", "c@example.com", "weakpass", "weakpass"),  // weak password
        ("carol", "c@example.com", "Hunter2!pw", "Different1!"), // mismatch
    ];
    for (u, e, p, pc) in cases {
        let res = gate.register(u, e, p, pc).await;
        assert!(matches!(res, Err(VaultError::Validation(_))), "case {u}/{e}");
    }
}

// ─── Test 6: folder lifecycle ───────────────────────────────────────────────

#[tokio::test]
async fn folder_rename_and_delete_are_owner_only() {
    let (gate, vault, _store) = setup().await;

    gate.register("alice", "a@example.com", "Hunter2!pw", "Hunter2!pw")
        .await
        .unwrap();
    gate.register("bob", "b@example.com", "Hunter2!pw", "Hunter2!pw")
        .await
        .unwrap();
    let alice = gate.login("alice", "Hunter2!pw").await.unwrap();
    let bob = gate.login("bob", "Hunter2!pw").await.unwrap();

    let folder = vault.create_folder(&alice.user, "Work").await.unwrap();

    let denied = vault.rename_folder(&bob.user, &folder.id, "Mine").await;
    assert!(matches!(denied, Err(VaultError::NotOwned)));
    let missing = vault.rename_folder(&alice.user, "no-such-id", "X").await;
    assert!(matches!(missing, Err(VaultError::NotFound(_))));

    vault
        .rename_folder(&alice.user, &folder.id, "Projects")
        .await
        .unwrap();
    assert_eq!(vault.list_folders(&alice.user).await.unwrap()[0].name, "Projects");

    // Deleting the folder takes its credentials with it (schema cascade).
    vault
        .create_credential(
            &alice.user,
            &alice.key,
            NewCredential {
                name: "jira",
                login: "alice",
                secret: "x",
                folder_id: Some(&folder.id),
            },
        )
        .await
        .unwrap();
    vault.delete_folder(&alice.user, &folder.id).await.unwrap();
    assert!(vault.list_folders(&alice.user).await.unwrap().is_empty());
    assert!(vault.list_credentials(&alice.user).await.unwrap().is_empty());
}

// ─── Test 7: profile counts ─────────────────────────────────────────────────

#[tokio::test]
async fn profile_counts_span_direct_and_folder_credentials() {
    let (gate, vault, _store) = setup().await;

    gate.register("alice", "a@example.com", "Hunter2!pw", "Hunter2!pw")
        .await
        .unwrap();
    let alice = gate.login("alice", "Hunter2!pw").await.unwrap();

    let folder = vault.create_folder(&alice.user, "Work").await.unwrap();
    for (name, folder_id) in [("direct", None), ("nested", Some(folder.id.as_str()))] {
        vault
            .create_credential(
                &alice.user,
                &alice.key,
                NewCredential {
                    name,
                    login: "alice",
                    secret: "x",
                    folder_id,
                },
            )
            .await
            .unwrap();
    }

    let profile = gate.profile(&alice.user).await.unwrap();
    assert_eq!(profile.folder_count, 1);
    assert_eq!(profile.credential_count, 2);
    assert_eq!(profile.username, "alice");

    let missing = vault
        .update_credential(
            &alice.user,
            &alice.key,
            "no-such-credential",
            CredentialUpdate {
                name: "x",
                login: "x",
                secret: "x",
            },
        )
        .await;
    assert!(matches!(missing, Err(VaultError::NotFound(_))));
}

// ─── Test 8: profile update ─────────────────────────────────────────────────

#[tokio::test]
async fn profile_update_checks_uniqueness_excluding_own_row() {
    let (gate, _vault, store) = setup().await;

    let alice = gate
        .register("alice", "a@example.com", "Hunter2!pw", "Hunter2!pw")
        .await
        .unwrap();
    gate.register("bob", "b@example.com", "Hunter2!pw", "Hunter2!pw")
        .await
        .unwrap();

    // Plain username/email change.
    gate.update_profile(&alice, "alicia", "alicia@example.com")
        .await
        .expect("profile update");
    let row = store.user_by_id(&alice.id).await.unwrap().unwrap();
    assert_eq!(row.username, "alicia");
    assert_eq!(row.email, "alicia@example.com");

    // Re-casing your own name collides only with yourself, which is allowed.
    gate.update_profile(&row, "ALICIA", "alicia@example.com")
        .await
        .expect("re-case own username");
    let row = store.user_by_id(&row.id).await.unwrap().unwrap();
    assert_eq!(row.username, "ALICIA");

    // Colliding with another user, case-insensitively, is not.
    let taken = gate.update_profile(&row, "BOB", "alicia@example.com").await;
    assert!(matches!(taken, Err(VaultError::Validation(_))));

    let bad_email = gate.update_profile(&row, "alicia", "not-an-email").await;
    assert!(matches!(bad_email, Err(VaultError::Validation(_))));

    // Rejected updates leave the row untouched.
    let row = store.user_by_id(&row.id).await.unwrap().unwrap();
    assert_eq!(row.username, "ALICIA");
    assert_eq!(row.email, "alicia@example.com");
}
