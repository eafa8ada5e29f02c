use std::future::Future;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::*;

use crate::{handlers, middleware::track_metrics, AppState};

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/commands/cancel", post(handlers::cancel))
        .route("/api/v1/commands/status", post(handlers::status))
        .route("/api/v1/commands/output/check", post(handlers::check_output))
        .route(
            "/api/v1/commands/output/discover",
            post(handlers::discover_output),
        )
        .route("/api/v1/commands/run/check", post(handlers::run_check))
        .route("/api/v1/commands/run/discover", post(handlers::run_discover))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route_layer(from_fn_with_state(state.clone(), track_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves `app` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "command api listening");
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
