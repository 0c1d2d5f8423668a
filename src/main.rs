use qcvoc::{
    build_router, database,
    security::{start_cleanup_task, CleanupConfig, SecurityService, TokenConfig},
    AppState, Settings,
};
use std::error::Error;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qcvoc=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting QCVOC API server");

    let settings = Settings::load()?;
    let token_config = TokenConfig::from_settings(&settings);

    let app_state = match settings.connection_string.as_deref() {
        Some(url) => {
            let pool = database::connect(url).await?;
            database::initialize_schema(&pool).await?;
            AppState::postgres(pool, token_config)
        }
        None => {
            warn!("qcvoc_connectionstring is not set; data is kept in memory only");
            AppState::in_memory(token_config)
        }
    };

    if let Some(password) = settings.admin_password.as_deref() {
        SecurityService::from_state(&app_state)
            .ensure_administrator(password)
            .await?;
    }

    tokio::spawn(start_cleanup_task(
        Arc::clone(&app_state.refresh_token_repository),
        CleanupConfig::from_minutes(settings.token_cleanup_minutes),
    ));

    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_address).await?;
    info!("Server running on http://{}", settings.bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}
