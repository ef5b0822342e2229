//! # TaskHive API Server
//!
//! HTTP server for TaskHive: manager registration and login, worker
//! management, projects and holidays, all scoped to the caller's owning
//! manager.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/taskhive \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p taskhive-api
//! ```

use anyhow::Context;
use taskhive_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat},
};
use taskhive_shared::{
    db::{
        migrations::{ensure_database_exists, get_migration_status, run_migrations},
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    services::{credentials::TokenSettings, ServiceDeps, Services},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    init_tracing(config.log_format);

    tracing::info!(
        "TaskHive API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let mut db_config = DatabaseConfig::new(config.database.url.clone());
    db_config.max_connections = config.database.max_connections;

    if !config.api.production {
        ensure_database_exists(&config.database.url)
            .await
            .context("Failed to create database")?;
    }

    let pool = create_pool(db_config)
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    let status = get_migration_status(&pool).await?;
    tracing::info!(
        applied = status.applied_migrations,
        latest = ?status.latest_version,
        "Database schema up to date"
    );

    let tokens = TokenSettings::new(config.session.secret.clone())
        .with_ttl(chrono::Duration::hours(config.session.ttl_hours));
    let services = Services::build(ServiceDeps::postgres(pool.clone(), tokens));

    let bind_address = config.bind_address();
    let state = AppState::new(pool.clone(), config, services);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    close_pool(pool).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taskhive_api=debug,taskhive_shared=info,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
