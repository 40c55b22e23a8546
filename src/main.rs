//! Shelfkeeper Server - Library Reservation Backend
//!
//! REST API for books, borrower balances and reservations, plus the daily
//! reminder and late-fee jobs.

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelfkeeper_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::{email::EmailService, scheduler::Scheduler, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("shelfkeeper_server={},tower_http=debug", config.logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Shelfkeeper Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    // Create repository and services
    let repository = Repository::new(pool);
    let email = Arc::new(EmailService::new(config.email.clone()));
    let services = Services::new(repository, email);

    if config.scheduler.enabled {
        let scheduler = Scheduler::new(
            services.reservations.clone(),
            config.scheduler.reminder_at()?,
            config.scheduler.late_fee_at()?,
        );
        scheduler.start();
        tracing::info!(
            reminder_time = %config.scheduler.reminder_time,
            late_fee_time = %config.scheduler.late_fee_time,
            "Scheduled daily reservation jobs"
        );
    } else {
        tracing::warn!("Scheduler disabled, reminder and late-fee jobs will not run");
    }

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
