use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{NewUser, Role, UserModel};
use crate::shared::AppError;

const USER_COLUMNS: &str = "id, username, email, role, manager_id, created_at";

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository {
    async fn create_user(&self, user: &NewUser) -> Result<UserModel, AppError>;
    async fn get_user(&self, user_id: i64) -> Result<Option<UserModel>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;
    async fn list_by_role(&self, role: Role) -> Result<Vec<UserModel>, AppError>;
    async fn list_team(&self, manager_id: i64) -> Result<Vec<UserModel>, AppError>;

    /// Looks up a user only if they report directly to the given manager
    async fn find_team_member(
        &self,
        manager_id: i64,
        employee_id: i64,
    ) -> Result<Option<UserModel>, AppError>;

    async fn count_users(&self) -> Result<i64, AppError>;
    async fn delete_all_users(&self) -> Result<u64, AppError>;
}

#[derive(Default)]
struct UserTable {
    rows: BTreeMap<i64, UserModel>,
    last_id: i64,
}

/// In-memory implementation of UserRepository for development and testing
///
/// Mirrors the uniqueness constraints of the SQL schema so that services
/// see the same conflicts regardless of backend.
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &NewUser) -> Result<UserModel, AppError> {
        debug!(username = %user.username, role = %user.role, "Creating user in memory");

        let mut table = self.table.write().await;
        if table.rows.values().any(|u| u.username == user.username) {
            warn!(username = %user.username, "Username already exists in memory");
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        if table.rows.values().any(|u| u.email == user.email) {
            warn!(email = %user.email, "Email already exists in memory");
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        table.last_id += 1;
        let model = UserModel {
            id: table.last_id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            manager_id: user.manager_id,
            created_at: Utc::now(),
        };
        table.rows.insert(model.id, model.clone());

        debug!(user_id = model.id, "User created successfully in memory");
        Ok(model)
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<UserModel>, AppError> {
        Ok(self.table.read().await.rows.get(&user_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.email == email).cloned())
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<UserModel>, AppError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }

    async fn list_team(&self, manager_id: i64) -> Result<Vec<UserModel>, AppError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|u| u.reports_to(manager_id))
            .cloned()
            .collect())
    }

    async fn find_team_member(
        &self,
        manager_id: i64,
        employee_id: i64,
    ) -> Result<Option<UserModel>, AppError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .get(&employee_id)
            .filter(|u| u.reports_to(manager_id))
            .cloned())
    }

    async fn count_users(&self) -> Result<i64, AppError> {
        Ok(self.table.read().await.rows.len() as i64)
    }

    async fn delete_all_users(&self) -> Result<u64, AppError> {
        let mut table = self.table.write().await;
        let removed = table.rows.len() as u64;
        table.rows.clear();
        Ok(removed)
    }
}

/// SQLite implementation of user repository
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &NewUser) -> Result<UserModel, AppError> {
        debug!(username = %user.username, role = %user.role, "Creating user in database");

        let sql = format!(
            "INSERT INTO users (username, email, role, manager_id, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING {USER_COLUMNS}"
        );
        let model = sqlx::query_as::<_, UserModel>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(user.role)
            .bind(user.manager_id)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, username = %user.username, "Failed to create user in database");
                AppError::from(e)
            })?;

        debug!(user_id = model.id, "User created successfully in database");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: i64) -> Result<Option<UserModel>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, UserModel>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?");
        let user = sqlx::query_as::<_, UserModel>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        match &user {
            Some(u) => debug!(username = %username, user_id = u.id, "User found in database"),
            None => debug!(username = %username, "User not found in database"),
        }

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let user = sqlx::query_as::<_, UserModel>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn list_by_role(&self, role: Role) -> Result<Vec<UserModel>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE role = ? ORDER BY id");
        let users = sqlx::query_as::<_, UserModel>(&sql)
            .bind(role)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn list_team(&self, manager_id: i64) -> Result<Vec<UserModel>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE manager_id = ? ORDER BY id");
        let users = sqlx::query_as::<_, UserModel>(&sql)
            .bind(manager_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn find_team_member(
        &self,
        manager_id: i64,
        employee_id: i64,
    ) -> Result<Option<UserModel>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ? AND manager_id = ?");
        let user = sqlx::query_as::<_, UserModel>(&sql)
            .bind(employee_id)
            .bind(manager_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn count_users(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn delete_all_users(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await?;
        debug!(removed = result.rows_affected(), "Deleted all users from database");
        Ok(result.rows_affected())
    }
}
