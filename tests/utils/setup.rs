use axum::Router;

use feedback_tracker::{
    build_router, db, seed::seed_sample_data, sqlite_state, AppState, TokenConfig,
};

pub const TEST_SECRET: &str = "integration-test-secret";

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app: Router,
    pub state: AppState,
}

pub struct TestSetupBuilder {
    ttl_minutes: i64,
    seeded: bool,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            ttl_minutes: 30,
            seeded: true,
        }
    }

    pub fn with_token_ttl(mut self, minutes: i64) -> Self {
        self.ttl_minutes = minutes;
        self
    }

    #[allow(dead_code)]
    pub fn empty(mut self) -> Self {
        self.seeded = false;
        self
    }

    pub async fn build(self) -> TestSetup {
        let pool = db::connect_in_memory().await.unwrap();
        db::create_schema(&pool).await.unwrap();

        let state = sqlite_state(pool, TokenConfig::new(TEST_SECRET, self.ttl_minutes));

        if self.seeded {
            seed_sample_data(
                state.user_repository.as_ref(),
                state.feedback_repository.as_ref(),
            )
            .await
            .unwrap();
        }

        TestSetup {
            app: build_router(state.clone()),
            state,
        }
    }
}
