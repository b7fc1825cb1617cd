use axum::{extract::State, Extension, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{models::UserModel, service::UserService, types::UserResponse};
use crate::shared::{AppError, AppState};

/// HTTP handler returning the authenticated user
///
/// GET /users/me
#[instrument(name = "current_user", skip(current_user), fields(user_id = current_user.id))]
pub async fn current_user(Extension(current_user): Extension<UserModel>) -> Json<UserResponse> {
    Json(current_user.into())
}

/// HTTP handler for listing managers
///
/// GET /users/managers
/// Public: the registration form needs it before the caller has a token
#[instrument(name = "list_managers", skip(state))]
pub async fn list_managers(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let service = UserService::new(Arc::clone(&state.user_repository));
    let managers = service.list_managers().await?;

    info!(manager_count = managers.len(), "Managers listed successfully");

    Ok(Json(managers.into_iter().map(UserResponse::from).collect()))
}

/// HTTP handler for listing the caller's direct reports
///
/// GET /users/team
#[instrument(name = "get_team", skip(state, current_user), fields(user_id = current_user.id))]
pub async fn get_team(
    State(state): State<AppState>,
    Extension(current_user): Extension<UserModel>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let service = UserService::new(Arc::clone(&state.user_repository));
    let team = service.get_team(&current_user).await?;

    info!(team_size = team.len(), "Team listed successfully");

    Ok(Json(team.into_iter().map(UserResponse::from).collect()))
}
