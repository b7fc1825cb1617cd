use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use tracing::{info, instrument};

use super::{
    service::AuthService,
    types::{LoginRequest, LoginResponse},
};
use crate::shared::{AppError, AppState};
use crate::user::{types::RegisterRequest, UserService};

/// HTTP handler for logging in by username
///
/// POST /auth/login
/// Returns a bearer token and the user record
#[instrument(name = "login", skip(state, request), fields(username = %request.username))]
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<Json<LoginResponse>, AppError> {
    info!("Login attempt");

    let service = AuthService::new(state.user_repository.clone(), state.token_config.clone());
    let response = service.login(&request.username).await?;

    Ok(Json(response))
}

/// HTTP handler for registering a new user
///
/// POST /auth/register
/// The new user is logged in straight away
#[instrument(name = "register", skip(state, request), fields(username = %request.username))]
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = UserService::new(state.user_repository.clone())
        .register(request)
        .await?;

    let response = AuthService::new(state.user_repository.clone(), state.token_config.clone())
        .issue_token(user)?;

    info!(user_id = response.user.id, "Registration successful");
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::{insert_user, AppStateBuilder};
    use crate::user::models::Role;
    use crate::user::repository::{InMemoryUserRepository, UserRepository};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_handler() {
        let users = Arc::new(InMemoryUserRepository::new());
        insert_user(users.as_ref(), "john_manager", Role::Manager, None).await;
        let app = crate::build_router(AppStateBuilder::new().with_user_repository(users).build());

        let response = app
            .oneshot(post_json("/auth/login", r#"{"username": "john_manager"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let login: LoginResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(login.token_type, "bearer");
        assert_eq!(login.user.username, "john_manager");
        assert!(login.access_token.contains('.')); // JWT has dots
    }

    #[tokio::test]
    async fn test_login_handler_unknown_user() {
        let app = crate::build_router(AppStateBuilder::new().build());

        let response = app
            .oneshot(post_json("/auth/login", r#"{"username": "nobody"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            error["detail"],
            "User 'nobody' not found. Please check your username."
        );
    }

    #[tokio::test]
    async fn test_login_handler_empty_username_is_unauthorized() {
        let app = crate::build_router(AppStateBuilder::new().build());

        let response = app
            .oneshot(post_json("/auth/login", r#"{"username": ""}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(error["detail"], "User '' not found. Please check your username.");
    }

    #[tokio::test]
    async fn test_login_handler_malformed_body() {
        let app = crate::build_router(AppStateBuilder::new().build());

        let response = app
            .oneshot(post_json("/auth/login", r#"{"user": "john_manager"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(error["detail"].as_str().unwrap().contains("username"));
    }

    #[tokio::test]
    async fn test_register_handler_and_duplicate() {
        let users = Arc::new(InMemoryUserRepository::new());
        let app = crate::build_router(
            AppStateBuilder::new()
                .with_user_repository(users.clone())
                .build(),
        );
        let body = r#"{"username": "dana_manager", "email": "dana@company.com", "role": "manager"}"#;

        let response = app
            .clone()
            .oneshot(post_json("/auth/register", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let registered: LoginResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(registered.user.role, Role::Manager);
        assert!(!registered.access_token.is_empty());

        let response = app
            .oneshot(post_json("/auth/register", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(users.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_register_handler_invalid_email() {
        let app = crate::build_router(AppStateBuilder::new().build());

        let response = app
            .oneshot(post_json(
                "/auth/register",
                r#"{"username": "dana", "email": "nope", "role": "employee"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
