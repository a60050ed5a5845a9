//! Gate for endpoints that act on the caller's own data.

use std::sync::Arc;

use tracing::debug;

use murmur_core::error::AppError;
use murmur_database::store::UserDirectory;
use murmur_entity::user::UserSummary;

/// Checks that an authenticated caller still has a usable account.
#[derive(Debug, Clone)]
pub struct AccountService {
    users: Arc<dyn UserDirectory>,
}

impl AccountService {
    /// Creates a new account service.
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }

    /// The caller must exist and have confirmed their email.
    pub async fn require_verified(&self, user_id: i64) -> Result<UserSummary, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if !user.is_verified {
            debug!(user_id = %user_id, "Rejected unverified account");
            return Err(AppError::authorization("Please verify your email first"));
        }

        Ok(user)
    }
}
