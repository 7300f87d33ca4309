//! Job Board Authentication Backend
//!
//! Account registration, sessions, password recovery and role-gated
//! administration for the job board.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and routing
//! - Services: Credential logic, auth flows and mail delivery
//! - Repositories: Identity storage (PostgreSQL or in-memory)

use anyhow::Result;
use jobboard_backend::{
    config::{self, StorageBackend},
    db,
    repositories::{MemoryUserStore, PgUserStore, UserStore},
    routes,
    services::build_mailer,
    state::AppState,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        "Starting Job Board Backend"
    );

    // Validate production configuration
    if config::AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    let store = connect_store(&config).await?;
    let mailer = build_mailer(&config.mail)?;

    // Missing token secrets or lifetimes abort startup here
    let state = AppState::new(store, mailer, config.clone()).map_err(|e| {
        error!("Configuration error: {:#}", e);
        e
    })?;

    // Build application
    let app = routes::create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Open the configured identity store
async fn connect_store(config: &config::AppConfig) -> Result<Arc<dyn UserStore>> {
    match config.database.backend {
        StorageBackend::Postgres => {
            info!("Connecting to database...");
            let pool = db::create_pool(&config.database).await?;

            // Run migrations (skip in production if using separate migration job)
            if !config::AppConfig::is_production() {
                db::run_migrations(&pool).await?;
            }

            Ok(Arc::new(PgUserStore::new(pool)))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory identity store; accounts are lost on restart");
            Ok(Arc::new(MemoryUserStore::new()))
        }
    }
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "jobboard_backend=info,tower_http=info".into()
        } else {
            "jobboard_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Validate configuration for production deployment
fn validate_production_config(config: &config::AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    let weak = |secret: Option<&secrecy::SecretString>| {
        secret.map_or(true, |s| {
            let s = s.expose_secret();
            s.len() < 32 || s.contains("development")
        })
    };

    if weak(config.auth.jwt_secret.as_ref()) {
        errors.push("JWT secret must be at least 32 characters and not contain 'development'");
    }
    if weak(config.auth.reset_secret.as_ref()) {
        errors.push("Reset secret must be at least 32 characters and not contain 'development'");
    }

    if config.database.backend == StorageBackend::Memory {
        errors.push("The in-memory identity store is not allowed in production");
    }

    // Check database URL is not localhost in production
    if config.database.url.contains("localhost") || config.database.url.contains("127.0.0.1") {
        warn!("Database URL contains localhost - ensure this is intentional for production");
    }

    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
