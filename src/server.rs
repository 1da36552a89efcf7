use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    config::Config,
    handlers::{self, session::AppState},
    metrics,
    providers::gemini::GeminiProvider,
    session::Orchestrator,
};

/// Uploads arrive base64-encoded, so this sits well above the 5 MiB image ceiling
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Start the analyzer server
///
/// This function:
/// 1. Initializes metrics
/// 2. Creates the session orchestrator backed by the Gemini client
/// 3. Binds to the configured address
/// 4. Serves requests until SIGINT/SIGTERM
pub async fn start_server(config: Config) -> Result<()> {
    info!("Initializing Prometheus metrics...");
    let metrics_handle = Arc::new(metrics::init_metrics()?);

    let provider = GeminiProvider::new(reqwest::Client::new(), config.gemini.clone());
    let app_state = AppState {
        orchestrator: Arc::new(Orchestrator::new(Arc::new(provider))),
    };

    let app = create_router(app_state, metrics_handle);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting decoration analyzer on http://{}", addr);
    info!(
        "Inference: model {} at {} (timeout {}s)",
        config.gemini.model, config.gemini.base_url, config.gemini.timeout_seconds
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router(app_state: AppState, metrics_handle: Arc<PrometheusHandle>) -> Router {
    let api_routes = Router::new()
        .route(
            "/api/session",
            get(handlers::session::get_session).delete(handlers::session::end_session),
        )
        .route("/api/credential", post(handlers::session::submit_credential))
        .route("/api/image", post(handlers::session::upload_image))
        .route("/api/analyze", post(handlers::session::analyze))
        .with_state(app_state);

    Router::new()
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics_handler::metrics))
        .with_state(metrics_handle)
        .merge(api_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to setup SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down"),
        _ = terminate => info!("SIGTERM received, shutting down"),
    }
}
