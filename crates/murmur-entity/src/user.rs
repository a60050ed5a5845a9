//! User projection needed for rendering notifications.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The subset of a user row this service reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    /// User id.
    pub id: i64,
    /// Display name.
    pub username: String,
    /// Email confirmed with the account service.
    pub is_verified: bool,
}
