use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{FeedbackCounts, FeedbackModel, FeedbackScope, NewFeedback};
use crate::shared::AppError;

const FEEDBACK_COLUMNS: &str = "id, employee_id, manager_id, strengths, improvements, sentiment, \
                                acknowledged, created_at, updated_at";

/// Trait for feedback repository operations
#[async_trait]
pub trait FeedbackRepository {
    async fn create_feedback(&self, feedback: &NewFeedback) -> Result<FeedbackModel, AppError>;
    async fn get_feedback(&self, feedback_id: i64) -> Result<Option<FeedbackModel>, AppError>;

    /// Persists the mutable columns of an existing row
    async fn update_feedback(&self, feedback: &FeedbackModel) -> Result<(), AppError>;

    /// Rows visible in the scope, in creation order
    async fn list_feedback(&self, scope: FeedbackScope) -> Result<Vec<FeedbackModel>, AppError>;

    async fn count_feedback(&self, scope: FeedbackScope) -> Result<FeedbackCounts, AppError>;
    async fn delete_all_feedback(&self) -> Result<u64, AppError>;
}

#[derive(Default)]
struct FeedbackTable {
    rows: BTreeMap<i64, FeedbackModel>,
    last_id: i64,
}

/// In-memory implementation of FeedbackRepository for development and testing
#[derive(Default)]
pub struct InMemoryFeedbackRepository {
    table: RwLock<FeedbackTable>,
}

impl InMemoryFeedbackRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    #[instrument(skip(self, feedback))]
    async fn create_feedback(&self, feedback: &NewFeedback) -> Result<FeedbackModel, AppError> {
        let mut table = self.table.write().await;
        table.last_id += 1;

        let now = Utc::now();
        let model = FeedbackModel {
            id: table.last_id,
            employee_id: feedback.employee_id,
            manager_id: feedback.manager_id,
            strengths: feedback.strengths.clone(),
            improvements: feedback.improvements.clone(),
            sentiment: feedback.sentiment,
            acknowledged: false,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(model.id, model.clone());

        debug!(feedback_id = model.id, "Feedback created successfully in memory");
        Ok(model)
    }

    async fn get_feedback(&self, feedback_id: i64) -> Result<Option<FeedbackModel>, AppError> {
        Ok(self.table.read().await.rows.get(&feedback_id).cloned())
    }

    #[instrument(skip(self, feedback), fields(feedback_id = feedback.id))]
    async fn update_feedback(&self, feedback: &FeedbackModel) -> Result<(), AppError> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&feedback.id) {
            Some(row) => {
                row.strengths = feedback.strengths.clone();
                row.improvements = feedback.improvements.clone();
                row.sentiment = feedback.sentiment;
                row.acknowledged = feedback.acknowledged;
                row.updated_at = feedback.updated_at;
                Ok(())
            }
            None => {
                warn!("Feedback not found for update in memory");
                Err(AppError::NotFound("Feedback not found".to_string()))
            }
        }
    }

    async fn list_feedback(&self, scope: FeedbackScope) -> Result<Vec<FeedbackModel>, AppError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|row| scope.contains(row))
            .cloned()
            .collect())
    }

    async fn count_feedback(&self, scope: FeedbackScope) -> Result<FeedbackCounts, AppError> {
        let table = self.table.read().await;
        Ok(FeedbackCounts::tally(
            table.rows.values().filter(|row| scope.contains(row)),
        ))
    }

    async fn delete_all_feedback(&self) -> Result<u64, AppError> {
        let mut table = self.table.write().await;
        let removed = table.rows.len() as u64;
        table.rows.clear();
        Ok(removed)
    }
}

/// SQLite implementation of feedback repository
pub struct SqliteFeedbackRepository {
    pool: SqlitePool,
}

impl SqliteFeedbackRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackRepository for SqliteFeedbackRepository {
    #[instrument(skip(self, feedback), fields(employee_id = feedback.employee_id, manager_id = feedback.manager_id))]
    async fn create_feedback(&self, feedback: &NewFeedback) -> Result<FeedbackModel, AppError> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO feedbacks \
             (employee_id, manager_id, strengths, improvements, sentiment, acknowledged, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, 0, ?, ?) RETURNING {FEEDBACK_COLUMNS}"
        );

        let model = sqlx::query_as::<_, FeedbackModel>(&sql)
            .bind(feedback.employee_id)
            .bind(feedback.manager_id)
            .bind(&feedback.strengths)
            .bind(&feedback.improvements)
            .bind(feedback.sentiment)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to create feedback in database");
                AppError::from(e)
            })?;

        debug!(feedback_id = model.id, "Feedback created successfully in database");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn get_feedback(&self, feedback_id: i64) -> Result<Option<FeedbackModel>, AppError> {
        let sql = format!("SELECT {FEEDBACK_COLUMNS} FROM feedbacks WHERE id = ?");
        let feedback = sqlx::query_as::<_, FeedbackModel>(&sql)
            .bind(feedback_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(feedback)
    }

    #[instrument(skip(self, feedback), fields(feedback_id = feedback.id))]
    async fn update_feedback(&self, feedback: &FeedbackModel) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE feedbacks SET strengths = ?, improvements = ?, sentiment = ?, \
             acknowledged = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&feedback.strengths)
        .bind(&feedback.improvements)
        .bind(feedback.sentiment)
        .bind(feedback.acknowledged)
        .bind(feedback.updated_at)
        .bind(feedback.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to update feedback in database");
            AppError::from(e)
        })?;

        if result.rows_affected() == 0 {
            warn!("Feedback not found for update");
            return Err(AppError::NotFound("Feedback not found".to_string()));
        }

        debug!("Feedback updated successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_feedback(&self, scope: FeedbackScope) -> Result<Vec<FeedbackModel>, AppError> {
        let sql = format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedbacks WHERE {} ORDER BY id",
            scope.where_clause()
        );

        let mut query = sqlx::query_as::<_, FeedbackModel>(&sql);
        for value in scope.bind_values() {
            query = query.bind(value);
        }

        let rows = query.fetch_all(&self.pool).await?;
        debug!(row_count = rows.len(), "Feedback listed from database");
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn count_feedback(&self, scope: FeedbackScope) -> Result<FeedbackCounts, AppError> {
        let sql = format!(
            "SELECT COUNT(*) AS total, \
             COALESCE(SUM(CASE WHEN sentiment = 'positive' THEN 1 ELSE 0 END), 0) AS positive, \
             COALESCE(SUM(CASE WHEN sentiment = 'neutral' THEN 1 ELSE 0 END), 0) AS neutral, \
             COALESCE(SUM(CASE WHEN sentiment = 'negative' THEN 1 ELSE 0 END), 0) AS negative, \
             COALESCE(SUM(CASE WHEN acknowledged = 0 THEN 1 ELSE 0 END), 0) AS unacknowledged \
             FROM feedbacks WHERE {}",
            scope.where_clause()
        );

        let mut query = sqlx::query_as::<_, FeedbackCounts>(&sql);
        for value in scope.bind_values() {
            query = query.bind(value);
        }

        Ok(query.fetch_one(&self.pool).await?)
    }

    #[instrument(skip(self))]
    async fn delete_all_feedback(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM feedbacks")
            .execute(&self.pool)
            .await?;
        debug!(removed = result.rows_affected(), "Deleted all feedback from database");
        Ok(result.rows_affected())
    }
}
