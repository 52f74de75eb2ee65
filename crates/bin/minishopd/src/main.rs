//! # minishopd: minishop back-office daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations (adapters)
//! - Construct application services, injecting repositories via port traits
//! - Set up the persistent session store and its expiry sweeper
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer, no domain logic belongs here.

mod config;
mod mailer;

use std::time::Duration;

use tower_sessions::ExpiredDeletion;
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::EnvFilter;

use minishop_adapter_http_axum::state::AppState;
use minishop_adapter_http_axum::{router, session};
use minishop_adapter_storage_sqlite_sqlx::{
    SqliteCustomerRepository, SqliteOrderRepository, SqliteProductRepository,
    SqliteUserRepository,
};
use minishop_app::services::auth_service::AuthService;
use minishop_app::services::customer_service::CustomerService;
use minishop_app::services::order_service::OrderService;
use minishop_app::services::product_service::ProductService;

use crate::config::Config;
use crate::mailer::LogMailer;

const EXPIRED_SESSION_SWEEP: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = minishop_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database.url.clone(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Repositories
    let customer_repo = SqliteCustomerRepository::new(pool.clone());
    let product_repo = SqliteProductRepository::new(pool.clone());
    let order_repo = SqliteOrderRepository::new(pool.clone());
    let user_repo = SqliteUserRepository::new(pool.clone());

    // Services
    let state = AppState::new(
        CustomerService::new(customer_repo.clone()),
        ProductService::new(product_repo.clone()),
        OrderService::new(order_repo, customer_repo, product_repo),
        AuthService::new(user_repo, LogMailer),
    );

    // Sessions
    let store = SqliteStore::new(pool);
    store.migrate().await?;
    tokio::spawn(sweep_expired_sessions(store.clone()));

    let session_layer = session::layer(
        store,
        config.session.secure_cookies,
        config.session.inactivity(),
    );

    // HTTP
    let app = router::build(state, session_layer);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("minishopd listening on http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("minishopd stopped");
    Ok(())
}

/// Periodically remove expired sessions from the store.
async fn sweep_expired_sessions(store: SqliteStore) {
    let mut interval = tokio::time::interval(EXPIRED_SESSION_SWEEP);
    loop {
        interval.tick().await;
        if let Err(err) = store.delete_expired().await {
            tracing::warn!(error = %err, "failed to delete expired sessions");
        }
    }
}

/// Resolves once the process receives Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received, draining connections");
}
