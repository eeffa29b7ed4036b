//! Credential assembly.
//!
//! Drives one login attempt through its stages: wait for the interactive
//! login, race the intercepted auth response against a bounded settle
//! window, scrape browser storage, merge both sources, and backfill a
//! missing user id from the token's subject claim. Emits exactly one
//! normalized credential or a terminal error; never a partial credential.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::config::BrowserAuthConfig;
use super::error::{AuthError, Result};
use super::intercept::{InterceptedPayload, ResponseInterceptor};
use super::jwt;
use super::session::SessionAutomator;
use super::storage::{self, PartialCredential};

/// A bearer token plus derived identifiers sufficient to authenticate
/// subsequent API calls. Never constructed with an empty token or user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub user_id: String,
    pub public_user_id: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

/// Stages of one login attempt, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    AwaitingLogin,
    RacingSources,
    Backfilling,
}

/// Orchestrates one browser login attempt into a [`Credential`].
pub struct CredentialAssembler {
    config: BrowserAuthConfig,
}

impl CredentialAssembler {
    pub fn new(config: BrowserAuthConfig) -> Self {
        Self { config }
    }

    /// Run the full pipeline. Browser resources are released on every exit
    /// path, including deadline expiry and early failures.
    #[instrument(skip(self))]
    pub async fn acquire(&self) -> Result<Credential> {
        let mut automator = SessionAutomator::new(self.config.clone());
        let page = match automator.launch().await {
            Ok(page) => page,
            Err(error) => {
                automator.close().await;
                return Err(error);
            }
        };

        let result = self.drive(&automator, &page).await;
        automator.close().await;
        result
    }

    async fn drive(
        &self,
        automator: &SessionAutomator,
        page: &chromiumoxide::Page,
    ) -> Result<Credential> {
        // Register before navigation so the auth response cannot be missed
        let mut interceptor =
            ResponseInterceptor::attach(page, &self.config.auth_response_fragment).await?;
        automator.navigate(page, &self.config.login_url).await?;

        debug!(stage = ?Stage::AwaitingLogin, "waiting for interactive login");
        println!();
        println!("Please log in to Bring! in the browser window...");
        println!("(The browser will close automatically after successful login)");
        println!();

        let app_page = automator.wait_for_login(page).await?;

        debug!(stage = ?Stage::RacingSources, "racing token sources");
        println!("Login detected, extracting token...");

        let payload = interceptor
            .wait_for_payload(self.config.intercept_wait())
            .await;

        if payload.is_none() {
            println!("Extracting token from storage...");
            automator.wait_for_auth_storage(&app_page).await;
            // Give the app a moment to finish writing the remaining keys
            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        }

        let scraped = storage::extract(&app_page).await;

        debug!(stage = ?Stage::Backfilling, "normalizing credential");
        finalize(merge_sources(payload, scraped))
    }
}

/// Merge both sources field-wise, preferring the intercepted value.
pub(crate) fn merge_sources(
    payload: Option<InterceptedPayload>,
    scraped: PartialCredential,
) -> PartialCredential {
    let mut merged = match payload {
        Some(payload) => PartialCredential {
            access_token: non_empty(payload.access_token),
            user_uuid: non_empty(payload.uuid),
            public_user_uuid: non_empty(payload.public_uuid),
            user_name: non_empty(payload.name),
            email: None,
        },
        None => PartialCredential::default(),
    };
    merged.fill_missing_from(scraped);
    merged
}

/// Normalize the merged fields into a credential, backfilling the user id
/// from the token's subject claim when storage did not yield one.
pub(crate) fn finalize(merged: PartialCredential) -> Result<Credential> {
    let access_token = merged.access_token.ok_or(AuthError::MissingToken)?;

    let user_id = match merged.user_uuid {
        Some(user_id) => user_id,
        None => {
            let claims = jwt::decode(&access_token).map_err(|_| AuthError::MissingUserId)?;
            claims
                .user_id()
                .ok_or(AuthError::MissingUserId)?
                .to_string()
        }
    };

    Ok(Credential {
        access_token,
        user_id,
        public_user_id: merged.public_user_uuid,
        display_name: merged.user_name,
        email: merged.email,
    })
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;

    use super::*;

    fn payload(token: &str, uuid: &str) -> InterceptedPayload {
        InterceptedPayload {
            name: "Intercepted Name".to_string(),
            uuid: uuid.to_string(),
            public_uuid: "pub-intercepted".to_string(),
            access_token: token.to_string(),
            refresh_token: String::new(),
        }
    }

    fn token_with_subject(subject: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
        let claims = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{subject}"}}"#).as_bytes());
        format!("{header}.{claims}.")
    }

    #[test]
    fn test_interceptor_value_preferred() {
        let scraped = PartialCredential {
            access_token: Some("storage-token".into()),
            user_uuid: Some("storage-user".into()),
            email: Some("storage@example.com".into()),
            ..Default::default()
        };
        let merged = merge_sources(Some(payload("wire-token", "wire-user")), scraped);
        assert_eq!(merged.access_token.as_deref(), Some("wire-token"));
        assert_eq!(merged.user_uuid.as_deref(), Some("wire-user"));
        // Fields the interceptor does not carry fall through to storage
        assert_eq!(merged.email.as_deref(), Some("storage@example.com"));
    }

    #[test]
    fn test_empty_interceptor_fields_fall_through() {
        let scraped = PartialCredential {
            user_uuid: Some("storage-user".into()),
            ..Default::default()
        };
        let merged = merge_sources(Some(payload("wire-token", "")), scraped);
        assert_eq!(merged.user_uuid.as_deref(), Some("storage-user"));
    }

    #[test]
    fn test_finalize_requires_token() {
        let result = finalize(PartialCredential {
            user_uuid: Some("user".into()),
            ..Default::default()
        });
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_finalize_backfills_user_id_from_token() {
        // Storage yielded only the token; the subject claim supplies the id
        let merged = merge_sources(
            None,
            PartialCredential {
                access_token: Some(token_with_subject("X:Y:Z:uuid-123")),
                ..Default::default()
            },
        );
        let credential = finalize(merged).expect("credential should assemble");
        assert_eq!(credential.user_id, "uuid-123");
    }

    #[test]
    fn test_finalize_rejects_underivable_user_id() {
        let flat_subject = finalize(PartialCredential {
            access_token: Some(token_with_subject("just-a-user")),
            ..Default::default()
        });
        assert!(matches!(flat_subject, Err(AuthError::MissingUserId)));

        let opaque_token = finalize(PartialCredential {
            access_token: Some("opaque-not-a-jwt".into()),
            ..Default::default()
        });
        assert!(matches!(opaque_token, Err(AuthError::MissingUserId)));
    }

    #[test]
    fn test_finalize_keeps_optional_fields() {
        let credential = finalize(PartialCredential {
            access_token: Some("tok".into()),
            user_uuid: Some("user".into()),
            public_user_uuid: Some("pub".into()),
            user_name: Some("Name".into()),
            email: Some("e@example.com".into()),
        })
        .expect("credential should assemble");
        assert_eq!(credential.public_user_id.as_deref(), Some("pub"));
        assert_eq!(credential.display_name.as_deref(), Some("Name"));
        assert_eq!(credential.email.as_deref(), Some("e@example.com"));
    }
}
