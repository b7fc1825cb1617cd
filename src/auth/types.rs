use serde::{Deserialize, Serialize};

use crate::user::types::UserResponse;

/// JWT claims: the subject is the username
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthClaims {
    pub sub: String,
    pub exp: i64, // Expiration timestamp (standard JWT claim)
    pub iat: i64, // Issued at timestamp (standard JWT claim)
}

/// Request payload for logging in; an empty username is simply an unknown user
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

/// Response for login and registration
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: UserResponse,
}

impl LoginResponse {
    pub fn bearer(access_token: String, user: UserResponse) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            user,
        }
    }
}
