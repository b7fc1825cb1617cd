use axum::http::{HeaderValue, Method};
use clap::Parser;
use tower_http::cors::{AllowHeaders, CorsLayer};
use tracing::warn;

use crate::auth::TokenConfig;

pub const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

/// Server configuration, from flags or the environment (a `.env` file is honoured)
#[derive(Debug, Clone, Parser)]
#[command(name = "feedback-tracker", version, about = "Feedback System API")]
pub struct AppConfig {
    /// Address to listen on
    #[arg(long, env = "FEEDBACK_BIND", default_value = "0.0.0.0:8000")]
    pub bind: String,

    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://feedback.db")]
    pub database_url: String,

    /// Secret used to sign access tokens
    #[arg(long, env = "JWT_SECRET", default_value = DEFAULT_JWT_SECRET, hide_env_values = true)]
    pub jwt_secret: String,

    /// Access token lifetime in minutes
    #[arg(long, env = "ACCESS_TOKEN_EXPIRE_MINUTES", default_value_t = 30)]
    pub token_ttl_minutes: i64,

    /// Wipe the database and load sample users and feedback on startup (dev only)
    #[arg(long, env = "FEEDBACK_SEED", default_value_t = false)]
    pub seed: bool,

    /// Origins allowed by CORS, comma separated
    #[arg(
        long = "cors-origin",
        env = "FEEDBACK_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:5173,http://127.0.0.1:5173,https://localhost:5173,https://127.0.0.1:5173"
    )]
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn token_config(&self) -> TokenConfig {
        if self.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("JWT_SECRET is not set, falling back to the development secret");
        }
        TokenConfig::new(self.jwt_secret.clone(), self.token_ttl_minutes)
    }

    /// CORS for the browser client; credentials require explicit origins, methods and headers
    pub fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .cors_origins
            .iter()
            .filter_map(|origin| match origin.trim().parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    /// Declared default of an argument, read from the command definition so the
    /// process environment cannot leak in through the `env` fallbacks
    fn declared_default(id: &str) -> String {
        let command = AppConfig::command();
        let arg = command
            .get_arguments()
            .find(|arg| arg.get_id() == id)
            .unwrap_or_else(|| panic!("no argument {}", id));
        arg.get_default_values()
            .iter()
            .map(|value| value.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn test_defaults() {
        assert_eq!(declared_default("bind"), "0.0.0.0:8000");
        assert_eq!(declared_default("database_url"), "sqlite://feedback.db");
        assert_eq!(declared_default("jwt_secret"), DEFAULT_JWT_SECRET);
        assert_eq!(declared_default("token_ttl_minutes"), "30");
        assert_eq!(declared_default("seed"), "false");
        assert_eq!(declared_default("cors_origins").split(',').count(), 4);
    }

    #[test]
    fn test_env_names() {
        let command = AppConfig::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .map(|env| env.to_string_lossy().into_owned())
        };
        assert_eq!(env_of("database_url").as_deref(), Some("DATABASE_URL"));
        assert_eq!(
            env_of("token_ttl_minutes").as_deref(),
            Some("ACCESS_TOKEN_EXPIRE_MINUTES")
        );
        assert_eq!(env_of("seed").as_deref(), Some("FEEDBACK_SEED"));
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = AppConfig::try_parse_from([
            "feedback-tracker",
            "--seed",
            "--token-ttl-minutes",
            "5",
            "--cors-origin",
            "http://a.test,http://b.test",
        ])
        .unwrap();
        assert!(config.seed);
        assert_eq!(config.token_config().ttl, chrono::Duration::minutes(5));
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }
}
