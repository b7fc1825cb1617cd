// Public API - what other modules can use
pub use handlers::{login, register};
pub use middleware::jwt_auth;
pub use service::AuthService;
pub use token::TokenConfig;
pub use types::{AuthClaims, LoginResponse};

// Internal modules
mod handlers;
mod middleware;
mod service;
mod token;
pub mod types;
