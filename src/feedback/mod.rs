// Public API - what other modules can use
pub use handlers::{
    acknowledge_feedback, create_feedback, list_employee_feedback, list_feedback, update_feedback,
};
pub use models::{FeedbackModel, FeedbackPatch, FeedbackScope, Sentiment};
pub use service::FeedbackService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
