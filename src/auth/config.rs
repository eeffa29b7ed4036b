//! Configuration for the browser-assisted login pipeline.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Login page of the Bring! web app.
pub const LOGIN_URL: &str = "https://web.getbring.com/login";

/// In-app dashboard reached after a successful login.
pub const APP_URL: &str = "https://web.getbring.com/app";

/// Path segment identifying the auth response on the wire.
pub const AUTH_RESPONSE_FRAGMENT: &str = "/bringauth";

/// Default deadline for the human to complete the login.
pub const DEFAULT_LOGIN_TIMEOUT_SECS: u64 = 300;

/// Default window for the intercepted auth response to arrive.
pub const DEFAULT_INTERCEPT_WAIT_SECS: u64 = 10;

/// Default deadline for the token key to appear in browser storage.
pub const DEFAULT_STORAGE_WAIT_SECS: u64 = 90;

/// Polling interval for login detection.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Configuration for one browser login attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserAuthConfig {
    /// URL the browser is pointed at initially.
    pub login_url: String,
    /// In-app URL signalling a completed login.
    pub app_url: String,
    /// Substring of the auth response URL to intercept.
    pub auth_response_fragment: String,
    /// Deadline in seconds for the interactive login.
    pub login_timeout_secs: u64,
    /// Window in seconds to wait for the intercepted auth response.
    pub intercept_wait_secs: u64,
    /// Deadline in seconds for the token key to appear in storage.
    pub storage_wait_secs: u64,
    /// Polling interval in milliseconds for login detection.
    pub poll_interval_ms: u64,
    /// Override for the durable browser profile directory.
    pub profile_dir: Option<PathBuf>,
}

impl Default for BrowserAuthConfig {
    fn default() -> Self {
        Self {
            login_url: LOGIN_URL.to_string(),
            app_url: APP_URL.to_string(),
            auth_response_fragment: AUTH_RESPONSE_FRAGMENT.to_string(),
            login_timeout_secs: DEFAULT_LOGIN_TIMEOUT_SECS,
            intercept_wait_secs: DEFAULT_INTERCEPT_WAIT_SECS,
            storage_wait_secs: DEFAULT_STORAGE_WAIT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            profile_dir: None,
        }
    }
}

impl BrowserAuthConfig {
    /// Create a config with a custom login deadline.
    pub fn with_login_timeout(mut self, secs: u64) -> Self {
        self.login_timeout_secs = secs.max(1);
        self
    }

    /// Create a config with a custom profile directory.
    pub fn with_profile_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.profile_dir = Some(dir.into());
        self
    }

    /// Resolved browser profile directory (override or platform data dir).
    ///
    /// The profile is durable so cookies survive across login attempts.
    pub fn profile_dir(&self) -> PathBuf {
        self.profile_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("bringr").join("browser-profile"))
                .unwrap_or_else(|| PathBuf::from(".bringr-browser-profile"))
        })
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }

    pub fn intercept_wait(&self) -> Duration {
        Duration::from_secs(self.intercept_wait_secs)
    }

    pub fn storage_wait(&self) -> Duration {
        Duration::from_secs(self.storage_wait_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Whether `candidate` is an in-app page: same host as the app URL and
    /// not under the login path.
    pub fn is_app_url(&self, candidate: &str) -> bool {
        let Ok(url) = Url::parse(candidate) else {
            return false;
        };
        let Some(host) = url.host_str() else {
            return false;
        };
        if self.app_host().as_deref() != Some(host) {
            return false;
        }
        !url.path().starts_with("/login")
    }

    fn app_host(&self) -> Option<String> {
        Url::parse(&self.app_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BrowserAuthConfig::default();
        assert_eq!(config.login_url, LOGIN_URL);
        assert_eq!(config.login_timeout_secs, 300);
        assert_eq!(config.intercept_wait_secs, 10);
        assert_eq!(config.storage_wait_secs, 90);
        assert_eq!(config.poll_interval_ms, 1000);
    }

    #[test]
    fn test_config_builders() {
        let config = BrowserAuthConfig::default()
            .with_login_timeout(60)
            .with_profile_dir("/tmp/profile");
        assert_eq!(config.login_timeout_secs, 60);
        assert_eq!(config.profile_dir(), PathBuf::from("/tmp/profile"));
    }

    #[test]
    fn test_is_app_url() {
        let config = BrowserAuthConfig::default();
        assert!(config.is_app_url("https://web.getbring.com/app/lists"));
        assert!(config.is_app_url("https://web.getbring.com/"));
        assert!(!config.is_app_url("https://web.getbring.com/login"));
        assert!(!config.is_app_url("https://web.getbring.com/login?next=/app"));
        assert!(!config.is_app_url("https://accounts.google.com/signin"));
        assert!(!config.is_app_url("about:blank"));
        assert!(!config.is_app_url("not a url"));
    }
}
