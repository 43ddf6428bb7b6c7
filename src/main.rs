use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marquee::api::middleware::session::{create_session_layer, AppState};
use marquee::config::Config;
use marquee::db;
use marquee::services::mailer::Mailer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marquee=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Marquee server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create session layer
    let session_layer =
        create_session_layer(pool.clone(), config.base_url.starts_with("https")).await?;
    tracing::info!("Session layer initialized");

    // Notification mailer (optional)
    let mailer = Mailer::from_config(&config);
    if mailer.is_none() {
        tracing::warn!("SMTP not configured; notification emails are disabled");
    }

    // Build application state
    let state = AppState {
        pool: pool.clone(),
        config: config.clone(),
        mailer,
    };

    // Build router
    let app = Router::new()
        .route("/health", get(marquee::api::health::health_check))
        .merge(marquee::api::events::router())
        .merge(marquee::api::orders::router())
        .merge(marquee::api::raffles::router())
        .merge(marquee::api::rsvps::router())
        .merge(marquee::api::submissions::router())
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, cleaning up...");
}
