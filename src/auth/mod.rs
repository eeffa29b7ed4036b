//! Browser-assisted login for Bring!
//!
//! Acquires a session credential by driving an interactive browser login:
//! a headful Chromium is launched under a durable profile, a human completes
//! the login (including any two-factor or bot-detection challenges), and the
//! access token plus user identifiers are captured from the auth response
//! on the wire, falling back to scraping browser storage. A missing user id
//! is backfilled from the token's subject claim.
//!
//! ```rust,no_run
//! use bringr::auth::{BrowserAuthConfig, CredentialAssembler};
//!
//! # async fn example() -> bringr::auth::Result<()> {
//! let assembler = CredentialAssembler::new(BrowserAuthConfig::default());
//! let credential = assembler.acquire().await?;
//! println!("logged in as {}", credential.user_id);
//! # Ok(())
//! # }
//! ```

pub(crate) mod assembler;
mod config;
mod error;
mod intercept;
mod jwt;
mod session;
pub(crate) mod storage;

pub use assembler::{Credential, CredentialAssembler};
pub use config::{BrowserAuthConfig, APP_URL, AUTH_RESPONSE_FRAGMENT, LOGIN_URL};
pub use error::{AuthError, Result};
pub use intercept::{InterceptedPayload, ResponseInterceptor};
pub use jwt::{decode as decode_jwt, is_expired, JwtClaims};
pub use session::SessionAutomator;
pub use storage::{PartialCredential, StorageSnapshot};
