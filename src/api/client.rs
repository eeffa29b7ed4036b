//! Bring! REST client.
//!
//! Authenticated with the bearer token and user id the login pipeline
//! produced. The service's fixed headers (API key, client tags, country)
//! travel with every request; the error envelope is decoded even on
//! HTTP 200 responses.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};

use super::error::{ApiError, Result};
use super::types::{
    BatchUpdateItem, ErrorResponse, ItemOperation, ListItemsResponse, LoadListsResponse,
    UserAccount,
};

/// Production REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.getbring.com/rest/v2/";

/// Public API key of the Bring! web app.
pub const WEB_APP_API_KEY: &str = "cof4Nc6D8saplXjE3h3HXqHH8m7VU2i1Gs0g85Sp";

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "BRINGR_BASE_URL";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Process-wide client configuration, injected rather than hard-coded at
/// call sites.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, always with a trailing slash.
    pub base_url: String,
    pub api_key: String,
    pub client_tag: String,
    pub country: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: WEB_APP_API_KEY.to_string(),
            client_tag: "webApp".to_string(),
            country: "DE".to_string(),
        }
    }
}

impl ApiConfig {
    /// Default configuration with the environment override applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base) = std::env::var(BASE_URL_ENV) {
            if !base.is_empty() {
                config.base_url = normalize_base_url(&base);
            }
        }
        config
    }
}

/// Token-based authentication material for the client.
#[derive(Debug, Clone)]
pub struct TokenAuth {
    pub access_token: String,
    pub user_uuid: String,
    pub public_user_uuid: Option<String>,
}

/// Authenticated Bring! API client.
pub struct BringClient {
    http: reqwest::Client,
    config: ApiConfig,
    auth: TokenAuth,
}

impl BringClient {
    /// Client from stored or freshly acquired token material.
    pub fn from_token(auth: TokenAuth) -> Result<Self> {
        Self::with_config(ApiConfig::from_env(), auth)
    }

    /// Client with explicit configuration (tests, alternate deployments).
    pub fn with_config(config: ApiConfig, auth: TokenAuth) -> Result<Self> {
        let headers = build_headers(&config, &auth)?;
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, config, auth })
    }

    /// All shopping lists of the authenticated user.
    #[instrument(skip(self))]
    pub async fn load_lists(&self) -> Result<LoadListsResponse> {
        let path = format!("bringusers/{}/lists", self.auth.user_uuid);
        self.get_json(&path).await
    }

    /// Open and recently purchased items of a list.
    #[instrument(skip(self))]
    pub async fn get_items(&self, list_uuid: &str) -> Result<ListItemsResponse> {
        self.get_json(&format!("bringlists/{list_uuid}")).await
    }

    /// Account details; used to validate a freshly acquired token before
    /// trusting it.
    #[instrument(skip(self))]
    pub async fn get_user_account(&self) -> Result<UserAccount> {
        self.get_json(&format!("bringusers/{}", self.auth.user_uuid))
            .await
    }

    /// Add an item to a list.
    pub async fn save_item(
        &self,
        list_uuid: &str,
        item_name: &str,
        specification: &str,
    ) -> Result<()> {
        let form = [
            ("purchase", item_name),
            ("recently", ""),
            ("specification", specification),
            ("remove", ""),
            ("sender", "null"),
        ];
        self.send_form(Method::PUT, &format!("bringlists/{list_uuid}"), &form)
            .await
    }

    /// Remove an item from a list.
    pub async fn remove_item(&self, list_uuid: &str, item_name: &str) -> Result<()> {
        let form = [
            ("purchase", ""),
            ("recently", ""),
            ("specification", ""),
            ("remove", item_name),
            ("sender", "null"),
        ];
        self.send_form(Method::PUT, &format!("bringlists/{list_uuid}"), &form)
            .await
    }

    /// Move an item to the recently-purchased section.
    pub async fn complete_item(&self, list_uuid: &str, item_name: &str) -> Result<()> {
        let form = [
            ("purchase", ""),
            ("recently", item_name),
            ("specification", ""),
            ("remove", ""),
            ("sender", "null"),
        ];
        self.send_form(Method::PUT, &format!("bringlists/{list_uuid}"), &form)
            .await
    }

    /// Apply one operation to a batch of items.
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn batch_update_items(
        &self,
        list_uuid: &str,
        items: &[BatchUpdateItem],
        operation: ItemOperation,
    ) -> Result<()> {
        let changes: Vec<serde_json::Value> = items
            .iter()
            .map(|item| {
                json!({
                    "accuracy": "0.0",
                    "altitude": "0.0",
                    "latitude": "0.0",
                    "longitude": "0.0",
                    "itemId": item.item_id,
                    "spec": item.spec.clone().unwrap_or_default(),
                    "uuid": item.uuid.clone().unwrap_or_default(),
                    "operation": operation,
                })
            })
            .collect();
        let payload = json!({ "changes": changes, "sender": "" });

        let body = self
            .request(
                Method::PUT,
                &format!("bringlists/{list_uuid}/items"),
                RequestBody::Json(payload),
            )
            .await?;
        debug!(response_len = body.len(), "batch update applied");
        Ok(())
    }

    /// Untyped recipe/inspiration content by id.
    #[instrument(skip(self))]
    pub async fn get_inspiration_details(&self, content_uuid: &str) -> Result<serde_json::Value> {
        self.get_json(&format!("bringtemplates/content/{content_uuid}"))
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.request(Method::GET, path, RequestBody::None).await?;
        decode_json(&body)
    }

    async fn send_form(&self, method: Method, path: &str, form: &[(&str, &str)]) -> Result<()> {
        self.request(method, path, RequestBody::Form(form)).await?;
        Ok(())
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: RequestBody<'_>,
    ) -> Result<String> {
        let url = format!("{}{}", self.config.base_url, path);
        let mut request = self.http.request(method, &url);
        match body {
            RequestBody::Form(pairs) => request = request.form(pairs),
            RequestBody::Json(value) => request = request.json(&value),
            RequestBody::None => {}
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if let Some(error) = decode_service_error(&text) {
            return Err(error);
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }
        Ok(text)
    }
}

enum RequestBody<'a> {
    None,
    Form(&'a [(&'a str, &'a str)]),
    Json(serde_json::Value),
}

fn build_headers(config: &ApiConfig, auth: &TokenAuth) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    headers.insert("X-BRING-API-KEY", header_value(&config.api_key)?);
    headers.insert("X-BRING-CLIENT", header_value(&config.client_tag)?);
    headers.insert("X-BRING-CLIENT-SOURCE", header_value(&config.client_tag)?);
    headers.insert("X-BRING-COUNTRY", header_value(&config.country)?);
    headers.insert("X-BRING-USER-UUID", header_value(&auth.user_uuid)?);
    headers.insert(
        AUTHORIZATION,
        header_value(&format!("Bearer {}", auth.access_token))?,
    );
    if let Some(public_uuid) = auth.public_user_uuid.as_deref().filter(|v| !v.is_empty()) {
        headers.insert("X-BRING-PUBLIC-USER-UUID", header_value(public_uuid)?);
    }

    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| ApiError::Config(format!("invalid header value: {e}")))
}

fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T> {
    if let Some(error) = decode_service_error(body) {
        return Err(error);
    }
    serde_json::from_str(body).map_err(Into::into)
}

/// Decode the service's error envelope, which can ride on any status code.
fn decode_service_error(body: &str) -> Option<ApiError> {
    let envelope: ErrorResponse = serde_json::from_str(body).ok()?;
    if envelope.error.is_empty() {
        return None;
    }
    let message = if !envelope.message.is_empty() {
        envelope.message
    } else if !envelope.error_description.is_empty() {
        envelope.error_description
    } else {
        envelope.error
    };
    Some(ApiError::Service { message })
}

fn normalize_base_url(base: &str) -> String {
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    }
}
