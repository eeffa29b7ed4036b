//! Browser session lifecycle for the interactive login.
//!
//! The browser runs headful under a durable profile directory so a human can
//! complete credentials, two-factor prompts, or bot-detection challenges,
//! and so cookies persist across attempts. One session serves one login
//! attempt; concurrent attempts are fenced by the engine's profile locking.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, instrument, warn};

use super::config::BrowserAuthConfig;
use super::error::{AuthError, Result};

/// Owns the browser process and detects login completion.
pub struct SessionAutomator {
    config: BrowserAuthConfig,
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
}

impl SessionAutomator {
    pub fn new(config: BrowserAuthConfig) -> Self {
        Self {
            config,
            browser: None,
            handler: None,
        }
    }

    /// Launch the browser and open a blank page for the caller to drive.
    #[instrument(skip(self))]
    pub async fn launch(&mut self) -> Result<Page> {
        let profile_dir = self.config.profile_dir();
        if let Err(e) = std::fs::create_dir_all(&profile_dir) {
            warn!(error = %e, dir = %profile_dir.display(), "cannot create profile directory");
        }

        let browser_config = BrowserConfig::builder()
            .with_head()
            .user_data_dir(&profile_dir)
            .window_size(1280, 800)
            .arg("--disable-blink-features=AutomationControlled")
            .build()
            .map_err(|reason| AuthError::Launch { reason })?;

        info!(profile = %profile_dir.display(), "launching browser");
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| AuthError::Launch {
                reason: e.to_string(),
            })?;

        // Drive the CDP message loop for the lifetime of the session
        let task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    error!(error = %e, "CDP event handler error");
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| AuthError::Protocol(format!("cannot open page: {e}")))?;

        self.browser = Some(browser);
        self.handler = Some(task);
        Ok(page)
    }

    /// Navigate the page and let the initial load settle.
    pub async fn navigate(&self, page: &Page, url: &str) -> Result<()> {
        page.goto(url)
            .await
            .map_err(|e| AuthError::Protocol(format!("navigation to {url} failed: {e}")))?;
        // Load events can be flaky on redirect-heavy logins; the polling
        // loops below tolerate a page that is still settling.
        let _ = page.wait_for_navigation().await;
        Ok(())
    }

    /// Poll every open page at a fixed cadence until one is on the app
    /// domain outside the login path; returns that page.
    ///
    /// The login may redirect into a new tab, so all pages in the browsing
    /// context are checked each tick.
    #[instrument(skip(self, page))]
    pub async fn wait_for_login(&self, page: &Page) -> Result<Page> {
        let deadline = self.config.login_timeout();
        let poll = self.config.poll_interval();

        let result = timeout(deadline, async {
            loop {
                if let Some(app_page) = self.find_app_page(page).await {
                    return app_page;
                }
                sleep(poll).await;
            }
        })
        .await;

        match result {
            Ok(app_page) => {
                info!("login detected");
                Ok(app_page)
            }
            Err(_) => Err(AuthError::LoginTimeout {
                seconds: self.config.login_timeout_secs,
            }),
        }
    }

    /// First open page on the app domain outside the login path, if any.
    pub async fn find_app_page(&self, fallback: &Page) -> Option<Page> {
        for candidate in self.open_pages(fallback).await {
            if let Ok(url) = candidate.url().await {
                let url = url.unwrap_or_default();
                if self.config.is_app_url(&url) {
                    debug!(url = %url, "found app page");
                    return Some(candidate);
                }
            }
        }
        None
    }

    async fn open_pages(&self, fallback: &Page) -> Vec<Page> {
        match &self.browser {
            Some(browser) => match browser.pages().await {
                Ok(pages) if !pages.is_empty() => pages,
                _ => vec![fallback.clone()],
            },
            None => vec![fallback.clone()],
        }
    }

    /// Wait for the canonical token key to appear in either storage scope.
    ///
    /// Expiry is non-fatal: returns false and the caller scrapes whatever
    /// is present.
    pub async fn wait_for_auth_storage(&self, page: &Page) -> bool {
        const PROBE: &str = r#"
            !!(window.localStorage.getItem('accessToken')
                || window.sessionStorage.getItem('accessToken'))
        "#;

        let deadline = self.config.storage_wait();
        let poll = self.config.poll_interval();

        let found = timeout(deadline, async {
            loop {
                let present = match page.evaluate(PROBE).await {
                    Ok(result) => result.into_value::<bool>().unwrap_or(false),
                    Err(e) => {
                        debug!(error = %e, "storage probe failed");
                        false
                    }
                };
                if present {
                    return;
                }
                sleep(poll).await;
            }
        })
        .await
        .is_ok();

        if !found {
            warn!(
                seconds = self.config.storage_wait_secs,
                "token key never appeared in storage"
            );
        }
        found
    }

    /// Release the browsing context and stop the engine. Safe to call on
    /// every exit path, including after launch failure.
    pub async fn close(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!(error = %e, "browser close failed");
            }
            let _ = browser.wait().await;
            info!("browser session closed");
        }
        if let Some(task) = self.handler.take() {
            task.abort();
        }
    }
}

impl Drop for SessionAutomator {
    fn drop(&mut self) {
        // Close is async and runs on every ordinary exit path; this only
        // stops the message loop if the automator is dropped mid-flight.
        if let Some(task) = self.handler.take() {
            task.abort();
        }
    }
}
