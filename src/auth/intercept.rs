//! Passive interception of the auth response.
//!
//! A listener task watches network responses on the login page for the auth
//! endpoint and offers the first valid payload into a capacity-1 channel.
//! The listener never blocks: while a payload is pending, later arrivals are
//! dropped (first-valid-wins).

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventResponseReceived, GetResponseBodyParams, GetResponseBodyReturns,
};
use chromiumoxide::Page;
use futures_util::StreamExt;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::error::{AuthError, Result};

/// Auth payload observed on the wire after a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct InterceptedPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uuid: String,
    #[serde(default, rename = "publicUuid")]
    pub public_uuid: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

/// Capacity-1 non-blocking handoff for the first valid payload.
struct PayloadSlot {
    tx: mpsc::Sender<InterceptedPayload>,
}

impl PayloadSlot {
    fn new() -> (Self, mpsc::Receiver<InterceptedPayload>) {
        let (tx, rx) = mpsc::channel(1);
        (Self { tx }, rx)
    }

    /// Offer a payload without blocking. Returns false if the slot was
    /// already occupied (or the consumer is gone) and the payload dropped.
    fn offer(&self, payload: InterceptedPayload) -> bool {
        self.tx.try_send(payload).is_ok()
    }
}

/// Page-scoped network listener delivering at most one auth payload.
pub struct ResponseInterceptor {
    rx: mpsc::Receiver<InterceptedPayload>,
    listener: JoinHandle<()>,
}

impl ResponseInterceptor {
    /// Register against `page` before navigation so no response is missed.
    pub async fn attach(page: &Page, endpoint_fragment: &str) -> Result<Self> {
        page.execute(EnableParams::default())
            .await
            .map_err(|e| AuthError::Protocol(format!("cannot enable network events: {e}")))?;

        let mut responses = page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(|e| AuthError::Protocol(format!("cannot listen for responses: {e}")))?;

        let (slot, rx) = PayloadSlot::new();
        let page = page.clone();
        let fragment = endpoint_fragment.to_string();

        let listener = tokio::spawn(async move {
            while let Some(event) = responses.next().await {
                if !matches_auth_response(event.response.status, &event.response.url, &fragment) {
                    continue;
                }
                trace!(url = %event.response.url, "auth endpoint response observed");

                let body = match page
                    .execute(GetResponseBodyParams::new(event.request_id.clone()))
                    .await
                {
                    Ok(response) => decode_body(&response.result),
                    Err(error) => {
                        debug!(error = %error, "cannot fetch auth response body");
                        continue;
                    }
                };
                let Some(body) = body else { continue };
                let Some(payload) = parse_payload(&body) else {
                    continue;
                };

                if slot.offer(payload) {
                    debug!("auth payload captured");
                } else {
                    debug!("auth payload slot already occupied, dropping later response");
                }
            }
        });

        Ok(Self { rx, listener })
    }

    /// Wait up to `timeout` for the intercepted payload. Absence is not an
    /// error; it signals fallback to storage extraction.
    pub async fn wait_for_payload(&mut self, timeout: Duration) -> Option<InterceptedPayload> {
        tokio::time::timeout(timeout, self.rx.recv())
            .await
            .ok()
            .flatten()
    }
}

impl Drop for ResponseInterceptor {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

fn matches_auth_response(status: i64, url: &str, fragment: &str) -> bool {
    status == 200 && url.contains(fragment)
}

fn decode_body(body: &GetResponseBodyReturns) -> Option<String> {
    if body.base64_encoded {
        let bytes = STANDARD.decode(&body.body).ok()?;
        String::from_utf8(bytes).ok()
    } else {
        Some(body.body.clone())
    }
}

/// Parse the auth payload, rejecting bodies without an access token.
fn parse_payload(body: &str) -> Option<InterceptedPayload> {
    serde_json::from_str::<InterceptedPayload>(body)
        .ok()
        .filter(|payload| !payload.access_token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(token: &str) -> InterceptedPayload {
        InterceptedPayload {
            name: "Tester".to_string(),
            uuid: "user-1".to_string(),
            public_uuid: "pub-1".to_string(),
            access_token: token.to_string(),
            refresh_token: String::new(),
        }
    }

    #[tokio::test]
    async fn test_slot_first_valid_wins() {
        let (slot, mut rx) = PayloadSlot::new();
        assert!(slot.offer(payload("first")));
        // Slot occupied: the second arrival is dropped without error
        assert!(!slot.offer(payload("second")));

        let delivered = rx.recv().await.expect("one payload delivered");
        assert_eq!(delivered.access_token, "first");

        // The drop is permanent; nothing else is pending
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_matches_auth_response() {
        assert!(matches_auth_response(
            200,
            "https://api.getbring.com/rest/v2/bringauth",
            "/bringauth"
        ));
        assert!(!matches_auth_response(401, "https://api.getbring.com/rest/v2/bringauth", "/bringauth"));
        assert!(!matches_auth_response(200, "https://api.getbring.com/rest/v2/bringlists/x", "/bringauth"));
    }

    #[test]
    fn test_parse_payload() {
        let body = r#"{"name":"N","uuid":"u","publicUuid":"p","access_token":"t","refresh_token":"r"}"#;
        let parsed = parse_payload(body).expect("payload should parse");
        assert_eq!(parsed.access_token, "t");
        assert_eq!(parsed.public_uuid, "p");
    }

    #[test]
    fn test_parse_payload_rejects_empty_token() {
        assert!(parse_payload(r#"{"uuid":"u","access_token":""}"#).is_none());
        assert!(parse_payload("not json").is_none());
    }

    #[test]
    fn test_decode_body() {
        let plain = GetResponseBodyReturns {
            body: "{}".to_string(),
            base64_encoded: false,
        };
        assert_eq!(decode_body(&plain).as_deref(), Some("{}"));

        let encoded = GetResponseBodyReturns {
            body: STANDARD.encode(r#"{"a":1}"#),
            base64_encoded: true,
        };
        assert_eq!(decode_body(&encoded).as_deref(), Some(r#"{"a":1}"#));
    }
}
