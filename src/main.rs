//! pulse-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST, SSE, and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use pulse_gateway::api;
use pulse_gateway::app_state::AppState;
use pulse_gateway::auth::{Authenticator, JwtAuthenticator, JwtSigner};
use pulse_gateway::config::GatewayConfig;
use pulse_gateway::persistence::UserRepository;
use pulse_gateway::realtime::{self, IdentityResolver, RealtimeHub};
use pulse_gateway::service::UserService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tracing::info!(addr = %config.listen_addr, "starting pulse-gateway");

    // Connect to PostgreSQL and apply migrations
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Build auth layer
    let signer = Arc::new(JwtSigner::new(
        &config.jwt_secret,
        &config.jwt_issuer,
        config.jwt_ttl_secs,
    ));
    let authenticator: Arc<dyn Authenticator> =
        Arc::new(JwtAuthenticator::new(Arc::clone(&signer)));

    // Build realtime hub
    let resolver = IdentityResolver::new(Arc::clone(&authenticator));
    let realtime_hub = Arc::new(RealtimeHub::new(resolver, config.outbound_queue_capacity));

    // Build service layer
    let users = Arc::new(UserService::new(UserRepository::new(pool), signer));

    // Build application state
    let app_state = AppState {
        users,
        realtime: realtime_hub,
        authenticator,
    };

    // Build router
    let app = api::build_router()
        .merge(realtime::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
