//! Shared test helpers for integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use p256::ecdsa::SigningKey;
use p256::elliptic_curve::rand_core::{OsRng, RngCore};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use serde_json::Value;
use tower::ServiceExt;

use murmur_api::AppState;
use murmur_auth::{CredentialVerifier, JwtDecoder, JwtEncoder};
use murmur_core::config::AppConfig;
use murmur_database::{MemoryStore, Stores};
use murmur_push::{PushDeliveryClient, PushError, PushRequest, PushTransport};
use murmur_realtime::RealtimeEngine;

/// Records push requests and answers with a per-endpoint status (default 201).
#[derive(Debug, Default)]
pub struct RecordingTransport {
    statuses: Mutex<HashMap<String, u16>>,
    endpoints: Mutex<Vec<String>>,
}

impl RecordingTransport {
    /// Answer `status` for `endpoint`.
    pub fn respond(&self, endpoint: &str, status: u16) {
        self.statuses
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), status);
    }

    /// Endpoints posted to, in order.
    pub fn endpoints(&self) -> Vec<String> {
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

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store for direct seeding
    pub store: Arc<MemoryStore>,
    /// Realtime engine shared with the router
    pub engine: RealtimeEngine,
    /// Fake push service
    pub transport: Arc<RecordingTransport>,
    /// Application config
    pub config: AppConfig,
    encoder: JwtEncoder,
}

impl TestApp {
    /// App with VAPID keys and users 1 (bob), 2 (alice), 3 (carol).
    pub fn new() -> Self {
        let mut config = test_config();
        let (public, private) = vapid_keys();
        config.push.vapid_public_key = Some(public);
        config.push.vapid_private_key = Some(private);
        Self::with_config(config)
    }

    /// App with push delivery disabled.
    pub fn without_vapid() -> Self {
        Self::with_config(test_config())
    }

    /// Build an app from `config` on fresh in-memory stores.
    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        store.insert_user(1, "bob");
        store.insert_user(2, "alice");
        store.insert_user(3, "carol");
        store.insert_unverified_user(4, "dave");
        let stores = Stores::memory(store.clone());

        let transport = Arc::new(RecordingTransport::default());
        let push = PushDeliveryClient::with_transport(
            &config.push,
            stores.subscriptions.clone(),
            transport.clone(),
        )
        .expect("push client");
        let verifier: Arc<dyn CredentialVerifier> = Arc::new(JwtDecoder::new(&config.auth));
        let engine = RealtimeEngine::new(
            config.realtime.clone(),
            &stores,
            verifier.clone(),
            Arc::new(push),
        );

        let state = AppState::new(config.clone(), stores, None, verifier, engine.clone());
        let router = murmur_api::build_app(state);

        Self {
            router,
            store,
            engine,
            transport,
            encoder: JwtEncoder::new(&config.auth),
            config,
        }
    }

    /// Access token for `user_id`.
    pub fn token(&self, user_id: i64) -> String {
        self.encoder
            .access_token(user_id)
            .expect("Failed to encode token")
    }

    /// Serve the router on an ephemeral local port.
    pub async fn spawn(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("local addr");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });
        addr
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

fn test_config() -> AppConfig {
    AppConfig::from_toml(
        r#"
        [database]
        provider = "memory"

        [auth]
        jwt_secret = "integration-test-secret"

        [logging]
        format = "pretty"
        "#,
    )
    .expect("Failed to parse test config")
}

/// Fresh base64url VAPID key pair `(public, private)`.
pub fn vapid_keys() -> (String, String) {
    let signing = SigningKey::random(&mut OsRng);
    let public = signing.verifying_key().to_encoded_point(false);
    (
        URL_SAFE_NO_PAD.encode(public.as_bytes()),
        URL_SAFE_NO_PAD.encode(signing.to_bytes()),
    )
}

/// Browser subscription JSON with valid key material.
pub fn subscription_body(endpoint: &str) -> Value {
    let secret = p256::SecretKey::random(&mut OsRng);
    let public = secret.public_key().to_encoded_point(false);
    let mut auth = [0u8; 16];
    OsRng.fill_bytes(&mut auth);
    serde_json::json!({
        "endpoint": endpoint,
        "keys": {
            "p256dh": URL_SAFE_NO_PAD.encode(public.as_bytes()),
            "auth": URL_SAFE_NO_PAD.encode(auth),
        }
    })
}
