//! Access-token creation and verification.
//!
//! Issuing tokens belongs to the authentication service; [`create_access_token`]
//! exists for that service, the CLI, and tests.

use anyhow::anyhow;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use tonerdesk_config::JwtConfig;
use tonerdesk_core::{Actor, AppError};

use crate::claims::Claims;

/// Creates an access token embedding the actor's permission record.
///
/// # Errors
///
/// Returns an internal error if token encoding fails.
pub fn create_access_token(
    subject: &str,
    email: &str,
    actor: &Actor,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let exp = (now + jwt_config.access_token_expiry) as usize;

    let claims = Claims {
        sub: subject.to_string(),
        email: email.to_string(),
        actor: actor.clone(),
        exp,
        iat: now as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow!("Failed to create token: {}", e)))
}

/// Verifies an access token and returns the embedded claims.
///
/// # Errors
///
/// Returns an unauthorized error if the signature is invalid, the token has
/// expired, or the payload is malformed.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token"))
}
