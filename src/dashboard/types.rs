use serde::{Deserialize, Serialize};

use crate::feedback::models::FeedbackCounts;

/// Response for GET /dashboard/stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_feedback: i64,
    pub positive_feedback: i64,
    pub neutral_feedback: i64,
    pub negative_feedback: i64,
    pub unacknowledged_feedback: i64,
}

impl From<FeedbackCounts> for DashboardStats {
    fn from(counts: FeedbackCounts) -> Self {
        Self {
            total_feedback: counts.total,
            positive_feedback: counts.positive,
            neutral_feedback: counts.neutral,
            negative_feedback: counts.negative,
            unacknowledged_feedback: counts.unacknowledged,
        }
    }
}
