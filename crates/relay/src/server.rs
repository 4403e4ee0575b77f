//! Router assembly and serving.
//!
//! Requests flow through, outermost first:
//! 1. Request id (`X-Request-Id` on every response)
//! 2. Access log
//! 3. `TraceLayer` spans
//! 4. Body limit
//! 5. Handler

use std::{net::SocketAddr, time::Instant};

use axum::{
    extract::{ConnectInfo, DefaultBodyLimit, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::{handlers, AppState};

/// GitHub caps webhook payloads at 25 MB.
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Creates the relay router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/hook/:team/:pipeline/:resource", post(handlers::forward_webhook))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(access_log))
        .layer(middleware::from_fn(inject_request_id))
        .with_state(state)
}

async fn inject_request_id(mut req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).await;
    if let Ok(value) = request_id.parse() {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// One line per request: remote address, elapsed seconds, status, method, URI.
///
/// The remote address prefers `X-Forwarded-For` over the socket peer.
async fn access_log(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let remote = remote_addr(&req);
    let method = req.method().clone();
    let uri = req.uri().clone();
    let request_id = req.extensions().get::<String>().cloned().unwrap_or_default();

    let response = next.run(req).await;

    info!(
        remote = %remote,
        elapsed = started.elapsed().as_secs_f64(),
        status = response.status().as_u16(),
        method = %method,
        uri = %uri,
        request_id = %request_id,
        "request completed"
    );
    response
}

fn remote_addr(req: &Request) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        return forwarded.to_string();
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Binds `addr` and serves `router` until SIGINT or SIGTERM.
///
/// In-flight requests finish before this returns.
///
/// # Errors
///
/// Returns `std::io::Error` if the address cannot be bound.
pub async fn serve(addr: SocketAddr, router: Router) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "relay listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
