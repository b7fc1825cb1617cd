//! Sample data for local development.
//!
//! Seeding is destructive: every feedback row and every user is deleted first.

use tracing::{info, instrument};

use crate::feedback::models::{NewFeedback, Sentiment};
use crate::feedback::repository::FeedbackRepository;
use crate::shared::AppError;
use crate::user::models::{NewUser, Role, UserModel};
use crate::user::repository::UserRepository;

/// What a seeding run inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub managers: usize,
    pub employees: usize,
    pub feedback: usize,
}

async fn add_user(
    users: &(dyn UserRepository + Send + Sync),
    username: &str,
    email: &str,
    role: Role,
    manager: Option<&UserModel>,
) -> Result<UserModel, AppError> {
    users
        .create_user(&NewUser {
            username: username.to_string(),
            email: email.to_string(),
            role,
            manager_id: manager.map(|m| m.id),
        })
        .await
}

/// Wipes both tables and inserts two managers, three employees and two feedback entries
#[instrument(skip(users, feedback))]
pub async fn seed_sample_data(
    users: &(dyn UserRepository + Send + Sync),
    feedback: &(dyn FeedbackRepository + Send + Sync),
) -> Result<SeedSummary, AppError> {
    let removed_feedback = feedback.delete_all_feedback().await?;
    let removed_users = users.delete_all_users().await?;
    info!(removed_feedback, removed_users, "Cleared existing data");

    let john = add_user(users, "john_manager", "john@company.com", Role::Manager, None).await?;
    let sarah = add_user(users, "sarah_manager", "sarah@company.com", Role::Manager, None).await?;

    let alice = add_user(users, "alice_emp", "alice@company.com", Role::Employee, Some(&john)).await?;
    let bob = add_user(users, "bob_emp", "bob@company.com", Role::Employee, Some(&john)).await?;
    add_user(users, "charlie_emp", "charlie@company.com", Role::Employee, Some(&sarah)).await?;

    feedback
        .create_feedback(&NewFeedback {
            employee_id: alice.id,
            manager_id: john.id,
            strengths: "Excellent communication skills and team collaboration".to_string(),
            improvements: "Could improve time management and project planning".to_string(),
            sentiment: Sentiment::Positive,
        })
        .await?;

    feedback
        .create_feedback(&NewFeedback {
            employee_id: bob.id,
            manager_id: john.id,
            strengths: "Strong technical skills and problem-solving ability".to_string(),
            improvements: "Should work on presentation skills and client interaction".to_string(),
            sentiment: Sentiment::Neutral,
        })
        .await?;

    let summary = SeedSummary {
        managers: 2,
        employees: 3,
        feedback: 2,
    };
    info!(?summary, "Sample data initialized successfully");
    Ok(summary)
}
