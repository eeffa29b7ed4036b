//! Login pipeline flow tests: storage scraping through merge and backfill,
//! exercised over realistic snapshots without a live browser.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::auth::assembler::{finalize, merge_sources};
use crate::auth::storage::{from_snapshot, StorageSnapshot};
use crate::auth::{AuthError, InterceptedPayload};

fn token_with_subject(subject: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
    let claims = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{subject}"}}"#).as_bytes());
    format!("{header}.{claims}.")
}

fn snapshot_with_local(entries: &[(&str, &str)]) -> StorageSnapshot {
    StorageSnapshot {
        local: entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        session: Default::default(),
    }
}

#[test]
fn test_storage_only_login_backfills_user_id() {
    // Login detected; no matching network response; storage holds only the
    // token. The subject claim supplies the user id.
    let token = token_with_subject("X:Y:Z:uuid-123");
    let snapshot = snapshot_with_local(&[("accessToken", token.as_str())]);

    let scraped = from_snapshot(&snapshot);
    assert_eq!(scraped.access_token.as_deref(), Some(token.as_str()));
    assert_eq!(scraped.user_uuid, None);

    let credential = finalize(merge_sources(None, scraped)).expect("credential should assemble");
    assert_eq!(credential.user_id, "uuid-123");
    assert_eq!(credential.access_token, token);
}

#[test]
fn test_intercepted_payload_wins_over_storage() {
    let snapshot = snapshot_with_local(&[
        ("accessToken", "storage-token"),
        ("userUuid", "storage-user"),
        ("email", "stored@example.com"),
    ]);
    let payload = InterceptedPayload {
        name: "Wire Name".to_string(),
        uuid: "wire-user".to_string(),
        public_uuid: "wire-public".to_string(),
        access_token: "wire-token".to_string(),
        refresh_token: String::new(),
    };

    let credential = finalize(merge_sources(Some(payload), from_snapshot(&snapshot)))
        .expect("credential should assemble");

    assert_eq!(credential.access_token, "wire-token");
    assert_eq!(credential.user_id, "wire-user");
    assert_eq!(credential.public_user_id.as_deref(), Some("wire-public"));
    assert_eq!(credential.display_name.as_deref(), Some("Wire Name"));
    // The interceptor payload has no email field; storage fills it
    assert_eq!(credential.email.as_deref(), Some("stored@example.com"));
}

#[test]
fn test_heuristic_recovery_feeds_the_merge() {
    // No canonical keys at all: the token hides in a JSON blob under an
    // alias, the user id in a nested user object.
    let snapshot = snapshot_with_local(&[(
        "persist:session",
        r#"{"auth":{"access_token":"abc"},"user":{"uuid":"u-77"}}"#,
    )]);

    let credential = finalize(merge_sources(None, from_snapshot(&snapshot)))
        .expect("credential should assemble");
    assert_eq!(credential.access_token, "abc");
    assert_eq!(credential.user_id, "u-77");
}

#[test]
fn test_empty_sources_fail_with_missing_token() {
    let result = finalize(merge_sources(None, from_snapshot(&StorageSnapshot::default())));
    assert!(matches!(result, Err(AuthError::MissingToken)));
}

#[test]
fn test_opaque_token_without_user_id_fails() {
    let snapshot = snapshot_with_local(&[("accessToken", "opaque-bearer-value")]);
    let result = finalize(merge_sources(None, from_snapshot(&snapshot)));
    assert!(matches!(result, Err(AuthError::MissingUserId)));
}
