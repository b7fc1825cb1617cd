use axum::{extract::State, Extension, Json};
use tracing::instrument;

use super::{service::DashboardService, types::DashboardStats};
use crate::shared::{AppError, AppState};
use crate::user::models::UserModel;

/// HTTP handler for dashboard counts
///
/// GET /dashboard/stats
#[instrument(name = "dashboard_stats", skip(state, current_user), fields(user_id = current_user.id))]
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(current_user): Extension<UserModel>,
) -> Result<Json<DashboardStats>, AppError> {
    let stats = DashboardService::new(state.feedback_repository.clone())
        .get_stats(&current_user)
        .await?;
    Ok(Json(stats))
}
