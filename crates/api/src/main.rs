use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dossier_core::service::DossierService;
use dossier_core::store::{DossierStore, MemoryStore};
use dossier_events::{EmailConfig, EmailNotifier, EventBus, LogNotifier, Notifier};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dossier_api::config::{ServerConfig, StoreBackend};
use dossier_api::notifications::NotificationRouter;
use dossier_api::router::build_app_router;
use dossier_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dossier_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        store = config.store_backend.as_str(),
        "Loaded server configuration"
    );

    // --- Store ---
    let (store, pool) = match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory dossier store; data is lost on restart");
            let store: Arc<dyn DossierStore> = Arc::new(MemoryStore::new());
            (store, None)
        }
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .expect("DATABASE_URL must be set");

            let pool = dossier_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            dossier_db::health_check(&pool)
                .await
                .expect("Database health check failed");

            dossier_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            let store: Arc<dyn DossierStore> =
                Arc::new(dossier_db::PgDossierStore::new(pool.clone()));
            (store, Some(pool))
        }
    };

    let service = DossierService::new(store, config.pricing);

    // --- Event bus and notifications ---
    let event_bus = Arc::new(EventBus::default());

    let notifier: Arc<dyn Notifier> = match EmailConfig::from_env() {
        Some(email_config) => match EmailNotifier::new(email_config) {
            Ok(mailer) => Arc::new(mailer),
            Err(e) => {
                tracing::error!(error = %e, "Invalid SMTP configuration, logging notifications instead");
                Arc::new(LogNotifier)
            }
        },
        None => Arc::new(LogNotifier),
    };
    let router_handle = tokio::spawn(NotificationRouter::new(notifier).run(event_bus.subscribe()));

    // --- App ---
    let state = AppState {
        service,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        pool,
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

    // Dropping the last bus handle closes the channel and stops the router.
    drop(event_bus);
    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(drain, router_handle).await.is_err() {
        tracing::warn!("Notification router did not stop in time");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
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
        () = ctrl_c => tracing::info!("Received Ctrl-C, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
