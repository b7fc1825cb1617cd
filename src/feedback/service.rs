use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use super::{
    models::{FeedbackModel, FeedbackPatch, FeedbackScope, NewFeedback},
    repository::FeedbackRepository,
    types::{CreateFeedbackRequest, FeedbackResponse},
};
use crate::shared::AppError;
use crate::user::{models::UserModel, repository::UserRepository, types::UserResponse};

const EMPLOYEE_NOT_IN_TEAM: &str = "Employee not found in your team";
const FEEDBACK_NOT_FOUND: &str = "Feedback not found";

/// Service for the feedback lifecycle and its authorization rules
pub struct FeedbackService {
    feedback: Arc<dyn FeedbackRepository + Send + Sync>,
    users: Arc<dyn UserRepository + Send + Sync>,
}

impl FeedbackService {
    pub fn new(
        feedback: Arc<dyn FeedbackRepository + Send + Sync>,
        users: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self { feedback, users }
    }

    /// Creates feedback from the current manager about one of their direct reports
    #[instrument(skip(self, current_user, request), fields(manager_id = current_user.id, employee_id = request.employee_id))]
    pub async fn create_feedback(
        &self,
        current_user: &UserModel,
        request: CreateFeedbackRequest,
    ) -> Result<FeedbackResponse, AppError> {
        if !current_user.is_manager() {
            return Err(AppError::Forbidden(
                "Only managers can create feedback".to_string(),
            ));
        }
        request.validate()?;

        let employee = self
            .users
            .find_team_member(current_user.id, request.employee_id)
            .await?
            .ok_or_else(|| {
                warn!("Employee is not a direct report");
                AppError::NotFound(EMPLOYEE_NOT_IN_TEAM.to_string())
            })?;

        let feedback = self
            .feedback
            .create_feedback(&NewFeedback {
                employee_id: employee.id,
                manager_id: current_user.id,
                strengths: request.strengths,
                improvements: request.improvements,
                sentiment: request.sentiment,
            })
            .await?;

        info!(feedback_id = feedback.id, "Feedback created");
        Ok(FeedbackResponse::new(
            feedback,
            employee.into(),
            current_user.clone().into(),
        ))
    }

    /// Applies a partial update to feedback the current manager wrote
    #[instrument(skip(self, current_user, patch), fields(manager_id = current_user.id))]
    pub async fn update_feedback(
        &self,
        current_user: &UserModel,
        feedback_id: i64,
        patch: FeedbackPatch,
    ) -> Result<FeedbackResponse, AppError> {
        if !current_user.is_manager() {
            return Err(AppError::Forbidden(
                "Only managers can update feedback".to_string(),
            ));
        }
        patch.validate()?;

        let mut feedback = self
            .find_in_scope(feedback_id, FeedbackScope::for_user(current_user))
            .await?;

        patch.apply(&mut feedback);
        self.feedback.update_feedback(&feedback).await?;

        info!(feedback_id, "Feedback updated");
        let mut responses = self.with_users(vec![feedback]).await?;
        responses.pop().ok_or(AppError::Internal)
    }

    /// Marks feedback about the current employee as read; repeating it is a no-op
    #[instrument(skip(self, current_user), fields(employee_id = current_user.id))]
    pub async fn acknowledge_feedback(
        &self,
        current_user: &UserModel,
        feedback_id: i64,
    ) -> Result<(), AppError> {
        if !current_user.is_employee() {
            return Err(AppError::Forbidden(
                "Only employees can acknowledge feedback".to_string(),
            ));
        }

        let mut feedback = self
            .find_in_scope(feedback_id, FeedbackScope::for_user(current_user))
            .await?;

        if feedback.acknowledge() {
            self.feedback.update_feedback(&feedback).await?;
            info!(feedback_id, "Feedback acknowledged");
        } else {
            debug!(feedback_id, "Feedback was already acknowledged");
        }

        Ok(())
    }

    /// Lists the feedback the current user may see, in creation order
    #[instrument(skip(self, current_user), fields(user_id = current_user.id, role = %current_user.role))]
    pub async fn list_feedback(
        &self,
        current_user: &UserModel,
    ) -> Result<Vec<FeedbackResponse>, AppError> {
        let rows = self
            .feedback
            .list_feedback(FeedbackScope::for_user(current_user))
            .await?;

        debug!(row_count = rows.len(), "Feedback listed");
        self.with_users(rows).await
    }

    /// Lists the current manager's feedback about one direct report
    #[instrument(skip(self, current_user), fields(manager_id = current_user.id))]
    pub async fn list_feedback_for_employee(
        &self,
        current_user: &UserModel,
        employee_id: i64,
    ) -> Result<Vec<FeedbackResponse>, AppError> {
        if !current_user.is_manager() {
            return Err(AppError::Forbidden(
                "Only managers can view employee feedback".to_string(),
            ));
        }

        if self
            .users
            .find_team_member(current_user.id, employee_id)
            .await?
            .is_none()
        {
            warn!(employee_id, "Employee is not a direct report");
            return Err(AppError::NotFound(EMPLOYEE_NOT_IN_TEAM.to_string()));
        }

        let rows = self
            .feedback
            .list_feedback(FeedbackScope::Pair {
                manager_id: current_user.id,
                employee_id,
            })
            .await?;

        self.with_users(rows).await
    }

    /// Missing rows and rows outside the scope are indistinguishable to the caller
    async fn find_in_scope(
        &self,
        feedback_id: i64,
        scope: FeedbackScope,
    ) -> Result<FeedbackModel, AppError> {
        match self.feedback.get_feedback(feedback_id).await? {
            Some(feedback) if scope.contains(&feedback) => Ok(feedback),
            _ => {
                warn!(feedback_id, "Feedback not found in caller's scope");
                Err(AppError::NotFound(FEEDBACK_NOT_FOUND.to_string()))
            }
        }
    }

    /// Joins each row with its employee and manager records
    async fn with_users(
        &self,
        rows: Vec<FeedbackModel>,
    ) -> Result<Vec<FeedbackResponse>, AppError> {
        let mut users: HashMap<i64, UserResponse> = HashMap::new();
        let mut responses = Vec::with_capacity(rows.len());

        for row in rows {
            let employee = self.cached_user(&mut users, row.employee_id).await?;
            let manager = self.cached_user(&mut users, row.manager_id).await?;
            responses.push(FeedbackResponse::new(row, employee, manager));
        }

        Ok(responses)
    }

    async fn cached_user(
        &self,
        cache: &mut HashMap<i64, UserResponse>,
        user_id: i64,
    ) -> Result<UserResponse, AppError> {
        if let Some(user) = cache.get(&user_id) {
            return Ok(user.clone());
        }

        let user: UserResponse = self
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?
            .into();
        cache.insert(user_id, user.clone());
        Ok(user)
    }
}
