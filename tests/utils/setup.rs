use axum::Router;

use qcvoc::{
    build_router,
    security::{SecurityService, TokenConfig},
    AppState,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const ADMIN_NAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "letmein-admin";

pub struct TestSetup {
    pub app: Router,
    pub state: AppState,
}

pub struct TestSetupBuilder {
    access_token_minutes: i64,
    refresh_token_minutes: i64,
    seed_admin: bool,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            access_token_minutes: 15,
            refresh_token_minutes: 60,
            seed_admin: true,
        }
    }

    /// Issues refresh tokens that are already expired
    #[allow(dead_code)]
    pub fn with_expired_refresh_tokens(mut self) -> Self {
        self.refresh_token_minutes = -1;
        self
    }

    #[allow(dead_code)]
    pub fn without_admin(mut self) -> Self {
        self.seed_admin = false;
        self
    }

    pub async fn build(self) -> TestSetup {
        let token_config = TokenConfig::new(
            "integration-test-secret".to_string(),
            self.access_token_minutes,
            self.refresh_token_minutes,
        );
        let state = AppState::in_memory(token_config);

        if self.seed_admin {
            let seeded = SecurityService::from_state(&state)
                .ensure_administrator(ADMIN_PASSWORD)
                .await
                .unwrap();
            assert!(seeded, "a fresh state should have no accounts");
        }

        TestSetup {
            app: build_router(state.clone()),
            state,
        }
    }
}
