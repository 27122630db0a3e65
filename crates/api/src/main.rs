use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sitegen_core::clock::{Clock, SystemClock};
use sitegen_core::generation::Collaborators;
use sitegen_core::images::SeededPlaceholderSource;
use sitegen_core::store::{InMemoryProjectStore, ProjectStore};
use sitegen_llm::{ChatBackend, ChatClient, LlmConfig, LlmCopyWriter, LlmPlanner, LlmSiteGenerator};
use sitegen_storage::{StorageBackend, StorageConfig};
use sitegen_templates::{HandlebarsRenderer, TemplateCatalog};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sitegen_api::config::{GenerationSettings, ServerConfig};
use sitegen_api::router::build_app_router;
use sitegen_api::state::{AppState, Components};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitegen_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let settings = GenerationSettings::from_env();
    let llm_config = LlmConfig::from_env();
    let storage_config = StorageConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Project store ---
    let (store, pool) = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = sitegen_db::create_pool(&database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            sitegen_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            sitegen_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            let store: Arc<dyn ProjectStore> =
                Arc::new(sitegen_db::PgProjectStore::new(pool.clone()));
            (store, Some(pool))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, projects are kept in memory only");
            let store: Arc<dyn ProjectStore> = Arc::new(InMemoryProjectStore::new());
            (store, None)
        }
    };

    // --- Site storage ---
    let storage = sitegen_storage::build_storage(&storage_config)
        .await
        .expect("Failed to initialise site storage");
    let published_dir = match &storage_config.backend {
        StorageBackend::Local { root } => Some(root.clone()),
        StorageBackend::S3 { .. } => None,
    };

    // --- Templates ---
    let catalog = TemplateCatalog::load(&settings.templates_dir)
        .expect("Failed to load template catalog");
    let images = Arc::new(SeededPlaceholderSource::new(
        settings.placeholder_base_url.as_str(),
    ));
    let renderer = HandlebarsRenderer::new(Arc::new(catalog), images)
        .expect("Failed to compile templates");

    // --- AI collaborators ---
    let chat: Arc<dyn ChatBackend> =
        Arc::new(ChatClient::new(&llm_config).expect("Failed to build LLM client"));
    tracing::info!(base_url = %llm_config.base_url, model = %llm_config.model, "LLM client ready");
    let collaborators = Collaborators {
        planner: Arc::new(LlmPlanner::from_config(Arc::clone(&chat), &llm_config)),
        generator: Arc::new(LlmSiteGenerator::from_config(Arc::clone(&chat), &llm_config)),
        copy_writer: Arc::new(LlmCopyWriter::from_config(Arc::clone(&chat), &llm_config)),
        renderer: Arc::new(renderer),
    };

    // --- App state ---
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = AppState::new(
        config.clone(),
        settings,
        Components {
            store,
            storage,
            collaborators,
            clock,
            pool: pool.clone(),
        },
    );

    // --- Router ---
    let app = build_app_router(state, &config, published_dir.as_deref());

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

    if let Some(pool) = pool {
        let drain = Duration::from_secs(config.shutdown_timeout_secs);
        if tokio::time::timeout(drain, pool.close()).await.is_err() {
            tracing::warn!("Timed out closing database connections");
        }
    }

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
