//! Shared fakes for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use p256::ecdsa::SigningKey;
use p256::elliptic_curve::rand_core::{OsRng, RngCore};
use p256::elliptic_curve::sec1::ToEncodedPoint;

use murmur_auth::CredentialVerifier;
use murmur_core::config::PushConfig;
use murmur_core::error::AppError;
use murmur_core::result::AppResult;
use murmur_entity::push::{SubscriptionInfo, SubscriptionKeys};
use murmur_push::{PushError, PushRequest, PushTransport};

use crate::connection::state::{Authenticated, ConnectionAttempt};

/// Accepts `user-<id>` tokens.
#[derive(Debug)]
pub(crate) struct StaticVerifier;

#[async_trait]
impl CredentialVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> AppResult<i64> {
        token
            .strip_prefix("user-")
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| AppError::authentication("Invalid token"))
    }
}

/// An attempt for `user_id` that passed authentication.
pub(crate) fn verified(user_id: i64) -> Authenticated {
    let attempt = ConnectionAttempt::new();
    attempt.authenticating();
    attempt.accept(user_id)
}

/// Records push requests and answers with a per-endpoint status (default 201).
#[derive(Debug, Default)]
pub(crate) struct RecordingTransport {
    statuses: Mutex<HashMap<String, u16>>,
    endpoints: Mutex<Vec<String>>,
}

impl RecordingTransport {
    pub(crate) fn respond(&self, endpoint: &str, status: u16) {
        self.statuses
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), status);
    }

    pub(crate) fn endpoints(&self) -> Vec<String> {
        self.endpoints.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushTransport for RecordingTransport {
    async fn post(&self, request: PushRequest) -> Result<u16, PushError> {
        let status = self
            .statuses
            .lock()
            .unwrap()
            .get(&request.endpoint)
            .copied()
            .unwrap_or(201);
        self.endpoints.lock().unwrap().push(request.endpoint);
        Ok(status)
    }
}

/// Push configuration with a fresh VAPID key pair.
pub(crate) fn vapid_config() -> PushConfig {
    let signing = SigningKey::random(&mut OsRng);
    let public = signing.verifying_key().to_encoded_point(false);
    PushConfig {
        vapid_public_key: Some(URL_SAFE_NO_PAD.encode(public.as_bytes())),
        vapid_private_key: Some(URL_SAFE_NO_PAD.encode(signing.to_bytes())),
        ..PushConfig::default()
    }
}

/// A browser subscription with valid key material.
pub(crate) fn subscription(endpoint: &str) -> SubscriptionInfo {
    let secret = p256::SecretKey::random(&mut OsRng);
    let public = secret.public_key().to_encoded_point(false);
    let mut auth = [0u8; 16];
    OsRng.fill_bytes(&mut auth);
    SubscriptionInfo {
        endpoint: endpoint.to_string(),
        keys: SubscriptionKeys {
            p256dh: URL_SAFE_NO_PAD.encode(public.as_bytes()),
            auth: URL_SAFE_NO_PAD.encode(auth),
        },
    }
}
