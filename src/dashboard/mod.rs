pub use handlers::get_stats;
pub use service::DashboardService;
pub use types::DashboardStats;

mod handlers;
mod service;
mod types;
