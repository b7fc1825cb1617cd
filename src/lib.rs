// Library crate for the feedback tracking server
// This file exposes the router and modules for the binary and integration tests

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod feedback;
pub mod seed;
pub mod shared;
pub mod user;

use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// Re-export commonly used types for easier access in tests
pub use auth::TokenConfig;
pub use config::AppConfig;
pub use feedback::repository::{
    FeedbackRepository, InMemoryFeedbackRepository, SqliteFeedbackRepository,
};
pub use shared::{AppError, AppState};
pub use user::repository::{InMemoryUserRepository, SqliteUserRepository, UserRepository};

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Feedback System API",
        "version": "1.0.0"
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds an AppState backed by SQLite
pub fn sqlite_state(pool: sqlx::SqlitePool, token_config: TokenConfig) -> AppState {
    AppState::new(
        Arc::new(SqliteUserRepository::new(pool.clone())),
        Arc::new(SqliteFeedbackRepository::new(pool)),
        token_config,
    )
}

/// Builds the full HTTP API. Routes behind `jwt_auth` see the caller as `Extension<UserModel>`.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/users/me", get(user::current_user))
        .route("/users/team", get(user::get_team))
        .route(
            "/feedback",
            get(feedback::list_feedback).post(feedback::create_feedback),
        )
        .route(
            "/feedback/employee/:employee_id",
            get(feedback::list_employee_feedback),
        )
        .route("/feedback/:feedback_id", put(feedback::update_feedback))
        .route(
            "/feedback/:feedback_id/acknowledge",
            put(feedback::acknowledge_feedback),
        )
        .route("/dashboard/stats", get(dashboard::get_stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::jwt_auth,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/users/managers", get(user::list_managers))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
