use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::models::{FeedbackModel, Sentiment};
use crate::user::types::UserResponse;

/// Request payload for creating feedback
///
/// The author is always the caller; a client-supplied manager_id is ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFeedbackRequest {
    pub employee_id: i64,
    #[validate(length(min = 1, message = "Strengths must not be empty"))]
    pub strengths: String,
    #[validate(length(min = 1, message = "Improvements must not be empty"))]
    pub improvements: String,
    pub sentiment: Sentiment,
}

/// Feedback row with both parties embedded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub id: i64,
    pub employee_id: i64,
    pub manager_id: i64,
    pub strengths: String,
    pub improvements: String,
    pub sentiment: Sentiment,
    pub acknowledged: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub employee: UserResponse,
    pub manager: UserResponse,
}

impl FeedbackResponse {
    pub fn new(model: FeedbackModel, employee: UserResponse, manager: UserResponse) -> Self {
        Self {
            id: model.id,
            employee_id: model.employee_id,
            manager_id: model.manager_id,
            strengths: model.strengths,
            improvements: model.improvements,
            sentiment: model.sentiment,
            acknowledged: model.acknowledged,
            created_at: model.created_at,
            updated_at: model.updated_at,
            employee,
            manager,
        }
    }
}

/// Plain message body, returned by acknowledge
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}
