use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sceneqa_api::config::ServerConfig;
use sceneqa_api::router::build_app_router;
use sceneqa_api::settings::SettingsStore;
use sceneqa_api::state::{AppState, ReviewSession};
use sceneqa_core::regeneration::{GenerationService, RegenerationCoordinator};
use sceneqa_events::{EventBus, EventLogger};
use sceneqa_generation::GenerationApi;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sceneqa_api=debug,sceneqa_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    tokio::fs::create_dir_all(&config.media_dir)
        .await
        .expect("Failed to create media directory");
    tracing::info!(media_dir = %config.media_dir.display(), "Media directory ready");

    // --- Generation settings ---
    let settings = Arc::new(SettingsStore::load(&config.settings_path, &config.default_backend_url).await);
    tracing::info!(backend_endpoint = %settings.backend_endpoint().await, "Generation settings loaded");

    // --- Regeneration ---
    let service: Arc<dyn GenerationService> = Arc::new(GenerationApi::new());
    let regeneration = Arc::new(RegenerationCoordinator::new(service));

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let logger_cancel = CancellationToken::new();
    let logger_handle = tokio::spawn(EventLogger::run(
        event_bus.subscribe(),
        logger_cancel.clone(),
    ));
    tracing::info!("Event logger started");

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        session: Arc::new(RwLock::new(ReviewSession::new())),
        settings,
        regeneration,
        event_bus: Arc::clone(&event_bus),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    logger_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), logger_handle).await;
    tracing::info!("Event logger stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
