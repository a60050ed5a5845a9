//! VAPID (RFC 8292) application server identification.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use dashmap::DashMap;
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use serde::Serialize;
use url::Url;

use murmur_core::config::PushConfig;
use murmur_core::error::AppError;

use crate::encryption::PUBLIC_KEY_LEN;
use crate::error::PushError;

/// Lifetime of a signed VAPID token.
const TOKEN_LIFETIME_SECS: i64 = 12 * 60 * 60;
/// Tokens this close to expiry are re-signed.
const TOKEN_REFRESH_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct CachedToken {
    jwt: String,
    exp: i64,
}

/// Signs `Authorization: vapid` headers with the server's P-256 key.
///
/// Tokens are cached per push-service origin.
pub struct VapidSigner {
    public_key_b64: String,
    signing_key: SigningKey,
    subject: String,
    cache: DashMap<String, CachedToken>,
}

impl std::fmt::Debug for VapidSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VapidSigner")
            .field("public_key", &self.public_key_b64)
            .field("subject", &self.subject)
            .finish()
    }
}

impl VapidSigner {
    /// Build from configuration. `Ok(None)` when no key pair is configured.
    pub fn from_config(config: &PushConfig) -> Result<Option<Self>, AppError> {
        if !config.is_configured() {
            return Ok(None);
        }
        let public = config.vapid_public_key.as_deref().unwrap_or_default().trim();
        let private = config.vapid_private_key.as_deref().unwrap_or_default().trim();
        Self::new(public, private, &config.vapid_subject).map(Some)
    }

    /// Build from base64url-encoded raw keys.
    pub fn new(public_key_b64: &str, private_key_b64: &str, subject: &str) -> Result<Self, AppError> {
        let public = URL_SAFE_NO_PAD
            .decode(public_key_b64)
            .map_err(|e| AppError::configuration(format!("Invalid VAPID public key: {e}")))?;
        if public.len() != PUBLIC_KEY_LEN {
            return Err(AppError::configuration(format!(
                "VAPID public key must decode to {PUBLIC_KEY_LEN} bytes"
            )));
        }

        let private = URL_SAFE_NO_PAD
            .decode(private_key_b64)
            .map_err(|e| AppError::configuration(format!("Invalid VAPID private key: {e}")))?;
        let private: [u8; 32] = private.try_into().map_err(|_| {
            AppError::configuration("VAPID private key must decode to 32 bytes")
        })?;
        let signing_key = SigningKey::from_bytes(&private.into())
            .map_err(|_| AppError::configuration("VAPID private key is not a valid P-256 scalar"))?;

        Ok(Self {
            public_key_b64: public_key_b64.to_string(),
            signing_key,
            subject: subject.to_string(),
            cache: DashMap::new(),
        })
    }

    /// The public key handed to browsers as `applicationServerKey`.
    pub fn public_key(&self) -> &str {
        &self.public_key_b64
    }

    /// The `sub` claim.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// `Authorization` header value for a request to `endpoint`.
    pub fn authorization(&self, endpoint: &str) -> Result<String, PushError> {
        let audience = audience(endpoint)?;
        let jwt = self.token_for(&audience)?;
        Ok(format!("vapid t={jwt}, k={}", self.public_key_b64))
    }

    fn token_for(&self, audience: &str) -> Result<String, PushError> {
        let now = Utc::now().timestamp();
        if let Some(entry) = self.cache.get(audience)
            && entry.exp - TOKEN_REFRESH_SKEW_SECS > now
        {
            return Ok(entry.jwt.clone());
        }

        let exp = now + TOKEN_LIFETIME_SECS;
        let jwt = self.sign(audience, exp)?;
        self.cache.insert(
            audience.to_string(),
            CachedToken {
                jwt: jwt.clone(),
                exp,
            },
        );
        Ok(jwt)
    }

    fn sign(&self, audience: &str, exp: i64) -> Result<String, PushError> {
        #[derive(Serialize)]
        struct Header {
            typ: &'static str,
            alg: &'static str,
        }

        #[derive(Serialize)]
        struct Claims<'a> {
            aud: &'a str,
            exp: i64,
            sub: &'a str,
        }

        let header = serde_json::to_vec(&Header {
            typ: "JWT",
            alg: "ES256",
        })
        .map_err(|e| PushError::failed(format!("VAPID header serialization failed: {e}")))?;
        let claims = serde_json::to_vec(&Claims {
            aud: audience,
            exp,
            sub: &self.subject,
        })
        .map_err(|e| PushError::failed(format!("VAPID claims serialization failed: {e}")))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(claims)
        );
        let signature: Signature = self.signing_key.sign(signing_input.as_bytes());
        Ok(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        ))
    }
}

/// The origin of a push endpoint, used as the VAPID `aud` claim.
pub fn audience(endpoint: &str) -> Result<String, PushError> {
    let url = Url::parse(endpoint)
        .map_err(|e| PushError::InvalidSubscription(format!("invalid endpoint URL: {e}")))?;
    let host = url
        .host()
        .ok_or_else(|| PushError::InvalidSubscription("endpoint URL has no host".into()))?;
    let host = match host {
        url::Host::Domain(d) => d.to_string(),
        url::Host::Ipv4(ip) => ip.to_string(),
        url::Host::Ipv6(ip) => format!("[{ip}]"),
    };
    Ok(match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    })
}
