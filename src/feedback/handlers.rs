use axum::{
    extract::{Path, State},
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use tracing::{info, instrument};

use super::{
    models::FeedbackPatch,
    service::FeedbackService,
    types::{CreateFeedbackRequest, FeedbackResponse, MessageResponse},
};
use crate::shared::{AppError, AppState};
use crate::user::models::UserModel;

fn service(state: &AppState) -> FeedbackService {
    FeedbackService::new(
        state.feedback_repository.clone(),
        state.user_repository.clone(),
    )
}

/// HTTP handler for creating feedback
///
/// POST /feedback
#[instrument(name = "create_feedback", skip(state, current_user, request), fields(user_id = current_user.id))]
pub async fn create_feedback(
    State(state): State<AppState>,
    Extension(current_user): Extension<UserModel>,
    WithRejection(Json(request), _): WithRejection<Json<CreateFeedbackRequest>, AppError>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let feedback = service(&state)
        .create_feedback(&current_user, request)
        .await?;

    info!(feedback_id = feedback.id, "Feedback created successfully");
    Ok(Json(feedback))
}

/// HTTP handler for listing the caller's feedback
///
/// GET /feedback
#[instrument(name = "list_feedback", skip(state, current_user), fields(user_id = current_user.id))]
pub async fn list_feedback(
    State(state): State<AppState>,
    Extension(current_user): Extension<UserModel>,
) -> Result<Json<Vec<FeedbackResponse>>, AppError> {
    let rows = service(&state).list_feedback(&current_user).await?;
    Ok(Json(rows))
}

/// HTTP handler for one report's feedback
///
/// GET /feedback/employee/:employee_id
#[instrument(name = "list_employee_feedback", skip(state, current_user), fields(user_id = current_user.id))]
pub async fn list_employee_feedback(
    State(state): State<AppState>,
    Extension(current_user): Extension<UserModel>,
    Path(employee_id): Path<i64>,
) -> Result<Json<Vec<FeedbackResponse>>, AppError> {
    let rows = service(&state)
        .list_feedback_for_employee(&current_user, employee_id)
        .await?;
    Ok(Json(rows))
}

/// HTTP handler for partially updating feedback
///
/// PUT /feedback/:feedback_id
#[instrument(name = "update_feedback", skip(state, current_user, patch), fields(user_id = current_user.id))]
pub async fn update_feedback(
    State(state): State<AppState>,
    Extension(current_user): Extension<UserModel>,
    Path(feedback_id): Path<i64>,
    WithRejection(Json(patch), _): WithRejection<Json<FeedbackPatch>, AppError>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let feedback = service(&state)
        .update_feedback(&current_user, feedback_id, patch)
        .await?;

    info!(feedback_id, "Feedback updated successfully");
    Ok(Json(feedback))
}

/// HTTP handler for acknowledging feedback
///
/// PUT /feedback/:feedback_id/acknowledge
#[instrument(name = "acknowledge_feedback", skip(state, current_user), fields(user_id = current_user.id))]
pub async fn acknowledge_feedback(
    State(state): State<AppState>,
    Extension(current_user): Extension<UserModel>,
    Path(feedback_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    service(&state)
        .acknowledge_feedback(&current_user, feedback_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "Feedback acknowledged successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::{insert_user, AppStateBuilder};
    use crate::user::models::Role;
    use crate::user::repository::InMemoryUserRepository;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    /// Router over john_manager -> alice_emp plus a lone sarah_manager, with tokens for each
    async fn app() -> (Router, String, String, String) {
        let users = Arc::new(InMemoryUserRepository::new());
        let john = insert_user(users.as_ref(), "john_manager", Role::Manager, None).await;
        insert_user(users.as_ref(), "sarah_manager", Role::Manager, None).await;
        insert_user(users.as_ref(), "alice_emp", Role::Employee, Some(john.id)).await;

        let state = AppStateBuilder::new().with_user_repository(users).build();
        let token = |name: &str| state.token_config.create_token(name).unwrap();
        let (john, sarah, alice) = (
            token("john_manager"),
            token("sarah_manager"),
            token("alice_emp"),
        );

        (crate::build_router(state), john, sarah, alice)
    }

    fn request(method: &str, uri: &str, token: &str, body: Option<&str>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {}", token));
        match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    const CREATE_BODY: &str = r#"{"employee_id": 3, "strengths": "Great demos", "improvements": "Docs", "sentiment": "positive"}"#;

    #[tokio::test]
    async fn test_create_feedback_handler() {
        let (app, john, _, _) = app().await;

        let response = app
            .oneshot(request("POST", "/feedback", &john, Some(CREATE_BODY)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let feedback: FeedbackResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(feedback.employee.username, "alice_emp");
        assert_eq!(feedback.manager.username, "john_manager");
        assert!(!feedback.acknowledged);
    }

    #[tokio::test]
    async fn test_create_feedback_handler_status_codes() {
        let (app, _, sarah, alice) = app().await;

        let response = app
            .clone()
            .oneshot(request("POST", "/feedback", &alice, Some(CREATE_BODY)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(request("POST", "/feedback", &sarah, Some(CREATE_BODY)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bad_sentiment = r#"{"employee_id": 3, "strengths": "a", "improvements": "b", "sentiment": "great"}"#;
        let response = app
            .oneshot(request("POST", "/feedback", &sarah, Some(bad_sentiment)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_update_and_acknowledge_handlers() {
        let (app, john, _, alice) = app().await;

        let response = app
            .clone()
            .oneshot(request("POST", "/feedback", &john, Some(CREATE_BODY)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(request(
                "PUT",
                "/feedback/1",
                &john,
                Some(r#"{"sentiment": "neutral"}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let updated: FeedbackResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(updated.strengths, "Great demos");
        assert_eq!(
            serde_json::to_value(updated.sentiment).unwrap(),
            serde_json::json!("neutral")
        );

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(request("PUT", "/feedback/1/acknowledge", &alice, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let message: MessageResponse = serde_json::from_slice(&body).unwrap();
            assert_eq!(message.message, "Feedback acknowledged successfully");
        }

        let response = app
            .oneshot(request("PUT", "/feedback/1/acknowledge", &john, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_employee_feedback_handler() {
        let (app, john, sarah, _) = app().await;

        app.clone()
            .oneshot(request("POST", "/feedback", &john, Some(CREATE_BODY)))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(request("GET", "/feedback/employee/3", &john, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let rows: Vec<FeedbackResponse> = serde_json::from_slice(&body).unwrap();
        assert_eq!(rows.len(), 1);

        let response = app
            .oneshot(request("GET", "/feedback/employee/3", &sarah, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
