use std::sync::Arc;
use tracing::{debug, instrument};

use super::types::DashboardStats;
use crate::feedback::{models::FeedbackScope, repository::FeedbackRepository};
use crate::shared::AppError;
use crate::user::models::UserModel;

/// Service for dashboard aggregates
pub struct DashboardService {
    repository: Arc<dyn FeedbackRepository + Send + Sync>,
}

impl DashboardService {
    pub fn new(repository: Arc<dyn FeedbackRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Counts the feedback the current user can see, split by sentiment and acknowledgment
    #[instrument(skip(self, current_user), fields(user_id = current_user.id, role = %current_user.role))]
    pub async fn get_stats(&self, current_user: &UserModel) -> Result<DashboardStats, AppError> {
        let counts = self
            .repository
            .count_feedback(FeedbackScope::for_user(current_user))
            .await?;

        debug!(total = counts.total, "Dashboard stats computed");
        Ok(counts.into())
    }
}
