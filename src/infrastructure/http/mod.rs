//! HTTP surface: health, Jira webhook, manual send and pairing page

pub mod auth;
pub mod handlers;
pub mod pairing;

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::application::services::NotificationService;
use crate::application::session::SessionManager;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionManager>,
    pub notifications: Arc<NotificationService>,
    /// Webhook secret; `None` accepts unauthenticated requests
    pub secret: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/webhook/jira", post(handlers::jira_webhook))
        .route("/test/send", post(handlers::test_send))
        .route("/qr", get(handlers::qr))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(state: AppState, addr: &str, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
