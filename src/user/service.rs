use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use super::{
    models::{NewUser, Role, UserModel},
    repository::UserRepository,
    types::RegisterRequest,
};
use crate::shared::AppError;

/// Service for user registration and the user directory
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Registers a new user after checking shape, uniqueness and the manager link
    #[instrument(skip(self, request), fields(username = %request.username, role = %request.role))]
    pub async fn register(&self, request: RegisterRequest) -> Result<UserModel, AppError> {
        request.validate()?;

        if self
            .repository
            .find_by_username(&request.username)
            .await?
            .is_some()
        {
            warn!("Registration rejected: username taken");
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        if self
            .repository
            .find_by_email(&request.email)
            .await?
            .is_some()
        {
            warn!("Registration rejected: email taken");
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        self.check_manager_link(request.role, request.manager_id)
            .await?;

        let user = self
            .repository
            .create_user(&NewUser {
                username: request.username,
                email: request.email,
                role: request.role,
                manager_id: request.manager_id,
            })
            .await?;

        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Managers stand alone; an employee's manager must exist and be a manager
    async fn check_manager_link(&self, role: Role, manager_id: Option<i64>) -> Result<(), AppError> {
        let Some(manager_id) = manager_id else {
            return Ok(());
        };

        if role == Role::Manager {
            return Err(AppError::Validation(
                "Managers cannot report to another manager".to_string(),
            ));
        }

        match self.repository.get_user(manager_id).await? {
            Some(manager) if manager.is_manager() => Ok(()),
            Some(_) => Err(AppError::Validation(format!(
                "User {} is not a manager",
                manager_id
            ))),
            None => Err(AppError::Validation(format!(
                "Manager {} does not exist",
                manager_id
            ))),
        }
    }

    /// Lists every manager, used by the registration form
    #[instrument(skip(self))]
    pub async fn list_managers(&self) -> Result<Vec<UserModel>, AppError> {
        let managers = self.repository.list_by_role(Role::Manager).await?;
        debug!(manager_count = managers.len(), "Managers listed");
        Ok(managers)
    }

    /// Lists the direct reports of the current user, who must be a manager
    #[instrument(skip(self, current_user), fields(user_id = current_user.id))]
    pub async fn get_team(&self, current_user: &UserModel) -> Result<Vec<UserModel>, AppError> {
        if !current_user.is_manager() {
            return Err(AppError::Forbidden(
                "Only managers can view team members".to_string(),
            ));
        }

        let team = self.repository.list_team(current_user.id).await?;
        debug!(team_size = team.len(), "Team listed");
        Ok(team)
    }
}
