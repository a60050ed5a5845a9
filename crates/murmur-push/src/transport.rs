//! HTTP transport to push services.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use murmur_core::error::AppError;

use crate::error::PushError;

/// One encrypted push message ready to POST.
#[derive(Debug, Clone)]
pub struct PushRequest {
    /// Push service URL.
    pub endpoint: String,
    /// `aes128gcm` body.
    pub body: Vec<u8>,
    /// Retention hint for the push service, in seconds.
    pub ttl_seconds: u32,
    /// `vapid t=..., k=...` header value.
    pub authorization: String,
}

/// Sends a [`PushRequest`] and returns the push service's HTTP status.
///
/// Connection-level failures are reported as `DeliveryFailed`.
#[async_trait]
pub trait PushTransport: Send + Sync + Debug + 'static {
    /// POST the request.
    async fn post(&self, request: PushRequest) -> Result<u16, PushError>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client with a per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::configuration(format!("Failed to build push HTTP client: {e}"))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PushTransport for ReqwestTransport {
    async fn post(&self, request: PushRequest) -> Result<u16, PushError> {
        let response = self
            .client
            .post(&request.endpoint)
            .header("TTL", request.ttl_seconds.to_string())
            .header("Content-Encoding", "aes128gcm")
            .header("Content-Type", "application/octet-stream")
            .header("Authorization", request.authorization)
            .body(request.body)
            .send()
            .await
            .map_err(|e| PushError::failed(format!("push request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::debug!(
                endpoint = %request.endpoint,
                status = status.as_u16(),
                body = %truncate(&text, 200),
                "Push service rejected message"
            );
        }
        Ok(status.as_u16())
    }
}

fn truncate(input: &str, max_chars: usize) -> String {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &input[..idx]),
        None => input.to_string(),
    }
}
