use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{token::TokenConfig, types::LoginResponse};
use crate::shared::AppError;
use crate::user::{models::UserModel, repository::UserRepository};

/// Service for authentication: username lookup and token round-trips
pub struct AuthService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    token_config: TokenConfig,
}

impl AuthService {
    pub fn new(
        repository: Arc<dyn UserRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            repository,
            token_config,
        }
    }

    /// Resolves a username to a user. There is no credential check.
    #[instrument(skip(self))]
    pub async fn authenticate_user(&self, username: &str) -> Result<UserModel, AppError> {
        match self.repository.find_by_username(username).await? {
            Some(user) => Ok(user),
            None => {
                warn!(username = %username, "Authentication failed");
                Err(AppError::Unauthorized(format!(
                    "User '{}' not found. Please check your username.",
                    username
                )))
            }
        }
    }

    /// Authenticates and issues a bearer token
    #[instrument(skip(self))]
    pub async fn login(&self, username: &str) -> Result<LoginResponse, AppError> {
        let user = self.authenticate_user(username).await?;
        let response = self.issue_token(user)?;
        info!(username = %username, "Login successful");
        Ok(response)
    }

    /// Wraps a user and a fresh token into the login response shape
    pub fn issue_token(&self, user: UserModel) -> Result<LoginResponse, AppError> {
        let token = self.token_config.create_token(&user.username)?;
        Ok(LoginResponse::bearer(token, user.into()))
    }

    /// Validates a token and resolves its subject back to a user
    #[instrument(skip(self, token))]
    pub async fn validate_token(&self, token: &str) -> Result<UserModel, AppError> {
        let claims = self.token_config.validate_token(token)?;

        match self.repository.find_by_username(&claims.sub).await? {
            Some(user) => Ok(user),
            None => {
                warn!(username = %claims.sub, "Token subject no longer exists");
                Err(AppError::Unauthorized(
                    "Could not validate credentials".to_string(),
                ))
            }
        }
    }
}
