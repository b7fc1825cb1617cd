// Public API - what other modules can use
pub use handlers::{current_user, get_team, list_managers};
pub use models::{Role, UserModel};
pub use service::UserService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
