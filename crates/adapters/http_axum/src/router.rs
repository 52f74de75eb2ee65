//! Axum router assembly.

use axum::Router;
use axum::middleware;
use axum::routing::get;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use minishop_app::ports::{
    CustomerRepository, Mailer, OrderRepository, ProductRepository, UserRepository,
};

use crate::session::access_filter;
use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Merges API routes under `/api` and the back-office pages at `/`. Every
/// route goes through the access filter, which reads the session set up by
/// `session_layer`. Includes a [`TraceLayer`] that logs each HTTP
/// request/response at the `DEBUG` level using the `tracing` ecosystem.
pub fn build<CR, PR, OR, UR, M, S>(
    state: AppState<CR, PR, OR, UR, M>,
    session_layer: SessionManagerLayer<S>,
) -> Router
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    S: SessionStore + Clone,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .merge(crate::dashboard::routes())
        .layer(middleware::from_fn(access_filter))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
