//! The credential verification seam.

use std::fmt::Debug;

use async_trait::async_trait;

use murmur_core::result::AppResult;

/// Maps a bearer credential to a user id.
///
/// Fails with an `Authentication` error for anything it cannot vouch for.
#[async_trait]
pub trait CredentialVerifier: Send + Sync + Debug + 'static {
    /// Verify `token` and return the user it belongs to.
    async fn verify(&self, token: &str) -> AppResult<i64>;
}
