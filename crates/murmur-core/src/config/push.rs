//! Web Push (VAPID) configuration.

use serde::{Deserialize, Serialize};

/// Web Push delivery settings.
///
/// Push is disabled unless both VAPID keys are present; every send then
/// becomes a logged no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Base64url (no padding) uncompressed P-256 public key, 65 bytes decoded.
    #[serde(default)]
    pub vapid_public_key: Option<String>,
    /// Base64url (no padding) raw P-256 private scalar, 32 bytes decoded.
    #[serde(default)]
    pub vapid_private_key: Option<String>,
    /// Contact URI placed in the VAPID `sub` claim.
    #[serde(default = "default_subject")]
    pub vapid_subject: String,
    /// Push service retention for undelivered messages.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u32,
    /// Per-request timeout against the push service.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Upper bound on concurrent in-flight push sends.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_sends: usize,
    /// Title shown on the device notification.
    #[serde(default = "default_title")]
    pub notification_title: String,
}

impl PushConfig {
    /// Both halves of the VAPID key pair are set and non-blank.
    pub fn is_configured(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        set(&self.vapid_public_key) && set(&self.vapid_private_key)
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            vapid_public_key: None,
            vapid_private_key: None,
            vapid_subject: default_subject(),
            ttl_seconds: default_ttl(),
            request_timeout_seconds: default_request_timeout(),
            max_concurrent_sends: default_max_concurrent(),
            notification_title: default_title(),
        }
    }
}

fn default_subject() -> String {
    "mailto:admin@example.com".to_string()
}

fn default_ttl() -> u32 {
    86_400
}

fn default_request_timeout() -> u64 {
    15
}

fn default_max_concurrent() -> usize {
    16
}

fn default_title() -> String {
    "New notification".to_string()
}
