use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::user::models::{Role, UserModel};

/// Categorical tone of a feedback entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// Database model for the feedbacks table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct FeedbackModel {
    pub id: i64,
    pub employee_id: i64,
    pub manager_id: i64,
    pub strengths: String,
    pub improvements: String,
    pub sentiment: Sentiment,
    pub acknowledged: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FeedbackModel {
    /// Marks the entry as read by the employee.
    /// Returns false when it was already acknowledged, leaving updated_at untouched.
    pub fn acknowledge(&mut self) -> bool {
        if self.acknowledged {
            return false;
        }
        self.acknowledged = true;
        self.updated_at = Utc::now();
        true
    }
}

/// Insert payload for a feedback row
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub employee_id: i64,
    pub manager_id: i64,
    pub strengths: String,
    pub improvements: String,
    pub sentiment: Sentiment,
}

/// The fields a manager may change after creation; supplied text follows the same rules as on create
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct FeedbackPatch {
    #[validate(length(min = 1, message = "Strengths must not be empty"))]
    pub strengths: Option<String>,
    #[validate(length(min = 1, message = "Improvements must not be empty"))]
    pub improvements: Option<String>,
    pub sentiment: Option<Sentiment>,
}

impl FeedbackPatch {
    /// Applies supplied fields one by one; updated_at is refreshed even for an empty patch
    pub fn apply(self, feedback: &mut FeedbackModel) {
        if let Some(strengths) = self.strengths {
            feedback.strengths = strengths;
        }
        if let Some(improvements) = self.improvements {
            feedback.improvements = improvements;
        }
        if let Some(sentiment) = self.sentiment {
            feedback.sentiment = sentiment;
        }
        feedback.updated_at = Utc::now();
    }
}

/// Which rows a query may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackScope {
    /// Everything a manager has written
    Manager(i64),
    /// Everything written about an employee
    Employee(i64),
    /// One manager's feedback about one of their reports
    Pair { manager_id: i64, employee_id: i64 },
}

impl FeedbackScope {
    /// Managers see what they authored, employees see what is about them
    pub fn for_user(user: &UserModel) -> Self {
        match user.role {
            Role::Manager => FeedbackScope::Manager(user.id),
            Role::Employee => FeedbackScope::Employee(user.id),
        }
    }

    pub fn contains(&self, feedback: &FeedbackModel) -> bool {
        match *self {
            FeedbackScope::Manager(id) => feedback.manager_id == id,
            FeedbackScope::Employee(id) => feedback.employee_id == id,
            FeedbackScope::Pair {
                manager_id,
                employee_id,
            } => feedback.manager_id == manager_id && feedback.employee_id == employee_id,
        }
    }

    pub(crate) fn where_clause(&self) -> &'static str {
        match self {
            FeedbackScope::Manager(_) => "manager_id = ?",
            FeedbackScope::Employee(_) => "employee_id = ?",
            FeedbackScope::Pair { .. } => "manager_id = ? AND employee_id = ?",
        }
    }

    pub(crate) fn bind_values(&self) -> Vec<i64> {
        match *self {
            FeedbackScope::Manager(id) | FeedbackScope::Employee(id) => vec![id],
            FeedbackScope::Pair {
                manager_id,
                employee_id,
            } => vec![manager_id, employee_id],
        }
    }
}

/// Counts over one scope of feedback
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct FeedbackCounts {
    pub total: i64,
    pub positive: i64,
    pub neutral: i64,
    pub negative: i64,
    pub unacknowledged: i64,
}

impl FeedbackCounts {
    pub fn tally<'a>(rows: impl IntoIterator<Item = &'a FeedbackModel>) -> Self {
        rows.into_iter().fold(Self::default(), |mut counts, row| {
            counts.total += 1;
            match row.sentiment {
                Sentiment::Positive => counts.positive += 1,
                Sentiment::Neutral => counts.neutral += 1,
                Sentiment::Negative => counts.negative += 1,
            }
            if !row.acknowledged {
                counts.unacknowledged += 1;
            }
            counts
        })
    }
}
