//! Credential extraction from browser storage.
//!
//! Phase 1 reads the canonical keys the web app writes. Phase 2 is a
//! heuristic recovery pass over everything in both storage scopes, used only
//! when the token or user id is still missing: it looks for JWT-shaped
//! substrings and probes JSON values through a fixed alias list per field.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chromiumoxide::Page;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Canonical storage keys written by the web app.
const CANONICAL_KEYS: [&str; 5] = ["accessToken", "userUuid", "publicUserUuid", "userName", "email"];

/// Alias probe order per field for the heuristic scan. Nested paths are
/// dot-separated object lookups.
const TOKEN_ALIASES: &[&str] = &[
    "access_token",
    "accessToken",
    "token",
    "auth.access_token",
    "auth.accessToken",
];
const USER_ID_ALIASES: &[&str] = &["userUuid", "user_uuid", "uuid", "user.uuid", "user.userUuid"];
const PUBLIC_ID_ALIASES: &[&str] = &["publicUuid", "public_user_uuid", "publicUserUuid"];
const NAME_ALIASES: &[&str] = &["name", "userName", "user.name", "user.userName"];
const EMAIL_ALIASES: &[&str] = &["email", "user.email"];

fn jwt_pattern() -> &'static Regex {
    static JWT_PATTERN: OnceLock<Regex> = OnceLock::new();
    JWT_PATTERN.get_or_init(|| {
        Regex::new(r"eyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+")
            .expect("JWT pattern is valid")
    })
}

/// One-shot dump of both storage scopes, taken in a single page evaluation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSnapshot {
    /// Persistent scope (`localStorage`).
    #[serde(default)]
    pub local: BTreeMap<String, String>,
    /// Session-lifetime scope (`sessionStorage`).
    #[serde(default)]
    pub session: BTreeMap<String, String>,
}

impl StorageSnapshot {
    fn scopes(&self) -> [&BTreeMap<String, String>; 2] {
        [&self.local, &self.session]
    }

    fn canonical(&self, key: &str) -> Option<String> {
        self.scopes()
            .into_iter()
            .find_map(|scope| scope.get(key))
            .filter(|v| !v.is_empty())
            .cloned()
    }
}

/// Credential fields recovered from storage. Any subset may be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialCredential {
    pub access_token: Option<String>,
    pub user_uuid: Option<String>,
    pub public_user_uuid: Option<String>,
    pub user_name: Option<String>,
    pub email: Option<String>,
}

impl PartialCredential {
    /// Both the token and the user id are known.
    pub fn has_identity(&self) -> bool {
        self.access_token.is_some() && self.user_uuid.is_some()
    }

    /// Copy fields from `other` without overwriting anything already set.
    pub fn fill_missing_from(&mut self, other: PartialCredential) {
        fill(&mut self.access_token, other.access_token);
        fill(&mut self.user_uuid, other.user_uuid);
        fill(&mut self.public_user_uuid, other.public_user_uuid);
        fill(&mut self.user_name, other.user_name);
        fill(&mut self.email, other.email);
    }
}

fn fill(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        *slot = value.filter(|v| !v.is_empty());
    }
}

/// Extract whatever credential fields the page's storage holds.
///
/// Never fails: evaluation errors degrade to an empty result.
pub async fn extract(page: &Page) -> PartialCredential {
    let snapshot = match snapshot(page).await {
        Ok(snapshot) => snapshot,
        Err(error) => {
            warn!(error = %error, "storage snapshot failed, continuing without it");
            return PartialCredential::default();
        }
    };
    from_snapshot(&snapshot)
}

/// Dump both storage scopes as string maps.
async fn snapshot(page: &Page) -> Result<StorageSnapshot, String> {
    let js = r#"
        (() => {
            const dump = (storage) => {
                const out = {};
                for (let i = 0; i < storage.length; i += 1) {
                    const key = storage.key(i);
                    const value = storage.getItem(key);
                    if (key && value) {
                        out[key] = value;
                    }
                }
                return out;
            };
            return { local: dump(window.localStorage), session: dump(window.sessionStorage) };
        })()
    "#;

    let result = page.evaluate(js).await.map_err(|e| e.to_string())?;
    result.into_value().map_err(|e| e.to_string())
}

/// Run both extraction phases over a snapshot.
pub(crate) fn from_snapshot(snapshot: &StorageSnapshot) -> PartialCredential {
    let mut partial = PartialCredential {
        access_token: snapshot.canonical(CANONICAL_KEYS[0]),
        user_uuid: snapshot.canonical(CANONICAL_KEYS[1]),
        public_user_uuid: snapshot.canonical(CANONICAL_KEYS[2]),
        user_name: snapshot.canonical(CANONICAL_KEYS[3]),
        email: snapshot.canonical(CANONICAL_KEYS[4]),
    };

    if !partial.has_identity() {
        debug!("canonical storage keys incomplete, running heuristic scan");
        scan_heuristic(snapshot, &mut partial);
    }

    partial
}

/// Heuristic recovery over every key in both scopes. First non-empty match
/// per field wins; scanning stops once the token and user id are found.
fn scan_heuristic(snapshot: &StorageSnapshot, partial: &mut PartialCredential) {
    for scope in snapshot.scopes() {
        for value in scope.values() {
            if partial.access_token.is_none() {
                if let Some(m) = jwt_pattern().find(value) {
                    partial.access_token = Some(m.as_str().to_string());
                }
            }

            if let Ok(parsed) = serde_json::from_str::<Value>(value) {
                fill(&mut partial.access_token, probe_first(&parsed, TOKEN_ALIASES));
                fill(&mut partial.user_uuid, probe_first(&parsed, USER_ID_ALIASES));
                fill(
                    &mut partial.public_user_uuid,
                    probe_first(&parsed, PUBLIC_ID_ALIASES),
                );
                fill(&mut partial.user_name, probe_first(&parsed, NAME_ALIASES));
                fill(&mut partial.email, probe_first(&parsed, EMAIL_ALIASES));
            }

            if partial.has_identity() {
                return;
            }
        }
    }
}

/// Probe a parsed JSON value through an alias list, returning the first
/// non-empty string hit.
fn probe_first(value: &Value, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find_map(|path| probe(value, path))
        .map(str::to_owned)
}

fn probe<'a>(value: &'a Value, path: &str) -> Option<&'a str> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    current.as_str().filter(|s| !s.is_empty())
}
