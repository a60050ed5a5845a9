//! JWT claims as issued by the account service.

use serde::{Deserialize, Serialize};

use murmur_core::error::AppError;

/// Claims payload of access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id as a decimal string.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default)]
    pub iat: i64,
    /// Token type.
    #[serde(rename = "type")]
    pub token_type: TokenType,
}

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived token for API and realtime access.
    Access,
    /// Long-lived token only accepted by the account service.
    Refresh,
}

impl Claims {
    /// Parses the subject into a user id.
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| AppError::authentication("Invalid token subject"))
    }
}
