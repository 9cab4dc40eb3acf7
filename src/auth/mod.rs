pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use crate::models::normalize_email;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export the pieces handlers and the server builder need.
pub use extractors::CurrentUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{generate_token, verify_token, Claims};

/// Payload for a login request. Normalize before validating so the email
/// check runs on the canonical form.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email, length(max = 120))]
    pub email: String,
    /// Not held to the registration policy: only non-emptiness is checked
    /// here, so the response does not hint at the stored password's shape.
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

impl LoginRequest {
    pub fn normalize(mut self) -> Self {
        self.email = normalize_email(&self.email);
        self
    }
}

/// Payload for a registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email, length(max = 120))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "must be 8-128 characters"))]
    pub password: String,
}

impl RegisterRequest {
    pub fn normalize(mut self) -> Self {
        self.email = normalize_email(&self.email);
        self
    }
}

/// Successful login response: the bearer token and its scheme.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}
