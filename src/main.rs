use clap::Parser;
use feedback_tracker::{build_router, db, seed, sqlite_state, AppConfig};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feedback_tracker=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::parse();
    info!("Starting Feedback System API");

    let pool = db::connect(&config.database_url).await?;
    db::create_schema(&pool).await?;

    let app_state = sqlite_state(pool, config.token_config());

    if config.seed {
        info!("Seeding sample data (existing rows will be deleted)");
        if let Err(e) = seed::seed_sample_data(
            app_state.user_repository.as_ref(),
            app_state.feedback_repository.as_ref(),
        )
        .await
        {
            error!(error = %e, "Error initializing sample data");
        }
    }

    let app = build_router(app_state).layer(config.cors_layer());

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("Server running on http://{}", config.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
