use dashboard_auth::app::app;
use dashboard_auth::core::auth::{AuthService, SessionConfig, SessionTokenManager, TokenError};
use dashboard_auth::core::config::Config;
use dashboard_auth::core::db::{DbError, UserRepository, create_pool};
use tower_http::compression::{CompressionLayer, CompressionLevel};

/// Signing secret used by debug builds when AUTH_SECRET is not set
const DEV_AUTH_SECRET: &str = "dashboard_dev_secret_key_not_for_production_32chars";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (if exists)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load application config from environment variables
    let config = Config::from_env();

    // Log config status (without revealing secrets)
    tracing::info!(
        "Config loaded: database={}, auth_secret={}",
        config.has_database(),
        config.has_auth_secret
    );

    let session_config = match SessionConfig::from_env() {
        Ok(session_config) => session_config,
        Err(e @ TokenError::MissingSecret) if cfg!(debug_assertions) => {
            tracing::warn!("{}; using development secret", e);
            SessionConfig::new(DEV_AUTH_SECRET)
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!("Session config: {:?}", session_config);

    let db_config = config
        .database
        .as_ref()
        .ok_or(DbError::MissingDatabaseUrl)?;
    tracing::info!("Database: {:?}", db_config);
    let pool = create_pool(db_config)?;

    let auth_service = AuthService::new(
        UserRepository::new(pool),
        SessionTokenManager::new(session_config),
    );

    let app = app(auth_service).layer(
        CompressionLayer::new()
            .br(true)
            .gzip(true)
            .quality(CompressionLevel::Default),
    );

    let listener = tokio::net::TcpListener::bind(&config.site_addr).await?;
    tracing::info!("listening on http://{}", &config.site_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
