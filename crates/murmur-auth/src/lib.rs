//! # murmur-auth
//!
//! Maps a bearer credential to a user id. Tokens are HS256 JWTs issued by
//! the account service; [`JwtEncoder`] exists for tests and tooling.

pub mod jwt;
pub mod verifier;

pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenType};
pub use verifier::CredentialVerifier;
