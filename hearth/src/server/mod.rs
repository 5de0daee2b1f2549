//! HTTP and WebSocket surface over a shared [`Network`].

mod routes;
mod websocket;

pub use routes::{ApiError, MessageBody};
pub use websocket::ClientId;

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    response::Response,
    routing::{get, post},
};
use log::info;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::{
    network::Network,
    storage::{Backend, SnapshotStore},
};

/// Shared state handed to every handler.
pub type AppState = Arc<Network<Backend>>;

/// Builds the full router: REST routes, `/ws` and `/health`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket_handler))
        .route("/users", get(routes::list_users))
        .route("/posts", get(routes::list_posts).post(routes::create_post))
        .route("/posts/:id/react", post(routes::react))
        .route("/posts/:id/comment", post(routes::comment))
        .route("/users/:id/friend-request", post(routes::send_friend_request))
        .route("/users/:id/accept-friend", post(routes::accept_friend))
        .route("/users/:id/cancel-request", post(routes::cancel_request))
        .route("/users/:id/remove-friend", post(routes::remove_friend))
        .route("/users/:id/delete-request", post(routes::delete_request))
        .route("/notifications/:user_id", get(routes::list_notifications))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves `router(network)` on `bind` until Ctrl-C.
pub async fn serve(bind: &str, network: AppState) -> Result<()> {
    let addr: SocketAddr = bind.parse().with_context(|| format!("Invalid bind address '{bind}'"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("listening on http://{addr} (storage: {})", network.store().describe());
    axum::serve(listener, router(network))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

async fn health_check() -> &'static str {
    "ok"
}

async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let observer = state.subscribe();
    ws.on_upgrade(move |socket| websocket::handle_connection(socket, observer))
}
