use crate::config::AuthConfig;
use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user's id.
    pub sub: Uuid,
    /// Issue timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiry timestamp (seconds since epoch), `iat` + configured TTL.
    pub exp: usize,
}

/// Issues a signed HS256 token for `user_id`, expiring after the
/// configured TTL.
pub fn generate_token(user_id: Uuid, auth: &AuthConfig) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + Duration::minutes(auth.token_ttl_minutes);

    let claims = Claims {
        sub: user_id,
        iat: now.timestamp() as usize,
        exp: expires_at.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("failed to sign token: {}", e)))
}

/// Verifies a token's signature and expiry and returns its claims.
///
/// Bad signature, malformed structure, a subject that is not a UUID, and
/// an elapsed TTL all collapse into the same `Unauthenticated` outcome;
/// callers must not be able to tell them apart.
pub fn verify_token(token: &str, auth: &AuthConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(AppError::from)
}
