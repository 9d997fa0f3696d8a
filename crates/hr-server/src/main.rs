//! hrdash server
//!
//! HTTP server for the HR dashboard backend.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hr_api::AppState;
use hr_core::config::{AppConfig, LogFormat, LoggingConfig};
use hr_db::{Database, DatabaseConfig, MemoryStore, PgStore, Store};

mod health;
mod metrics;

use health::{HealthChecker, HealthConfig, StoreBackend};
use metrics::Metrics;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let loaded = AppConfig::from_env();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    init_tracing(&config.logging);
    if let Err(e) = &loaded {
        warn!("Failed to load config from env: {}, using defaults", e);
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting hrdash"
    );

    let opened = open_store(&config).await?;
    let store = opened.store;
    let mut checker = HealthChecker::new(HealthConfig::default(), store.clone(), opened.backend);
    if let Some(database) = opened.database.clone() {
        checker = checker.with_database(database);
    }
    let health = Arc::new(checker);
    let metrics = Arc::new(Metrics::new());
    let api_state = AppState::new(store, config.auth.clone());

    spawn_session_sweeper(api_state.clone());

    let app = build_router(
        api_state,
        health,
        metrics,
        Duration::from_secs(config.server.request_timeout_seconds),
    );

    let addr = config.server_addr();
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(database) = opened.database {
        database.close().await;
    }
    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init(),
    }
}

struct OpenedStore {
    store: Arc<dyn Store>,
    backend: StoreBackend,
    /// Pool handle when running on Postgres
    database: Option<Database>,
}

/// Postgres when reachable; the in-memory store only when allowed
async fn open_store(config: &AppConfig) -> anyhow::Result<OpenedStore> {
    let db_config = DatabaseConfig::from(&config.database);
    match Database::connect(&db_config).await {
        Ok(db) => {
            db.migrate().await.context("running database migrations")?;
            info!("Connected to database");
            let store: Arc<dyn Store> = Arc::new(PgStore::new(db.pool().clone()));
            Ok(OpenedStore {
                store,
                backend: StoreBackend::Postgres,
                database: Some(db),
            })
        }
        Err(e) if config.database.allow_memory_fallback => {
            warn!(
                "Failed to connect to database: {}. Running on the in-memory store.",
                e
            );
            Ok(OpenedStore {
                store: Arc::new(MemoryStore::new()),
                backend: StoreBackend::Memory,
                database: None,
            })
        }
        Err(e) => Err(e).context("connecting to database"),
    }
}

fn spawn_session_sweeper(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = state.sessions.cleanup_expired();
            if removed > 0 {
                info!(removed, "expired sessions removed");
            }
        }
    });
}

fn build_router(
    api_state: AppState,
    health: Arc<HealthChecker>,
    metrics: Arc<Metrics>,
    request_timeout: Duration,
) -> Router {
    // No auth on health and metrics
    let health_routes = Router::new()
        .route("/health", get(health::liveness))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(health);

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .route("/metrics.json", get(metrics::json_metrics))
        .with_state(metrics.clone());

    Router::new()
        .merge(health_routes)
        .merge(metrics_routes)
        .merge(hr_api::router().with_state(api_state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .layer(middleware::from_fn_with_state(
            metrics,
            metrics::metrics_middleware,
        ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let health = Arc::new(HealthChecker::new(
            HealthConfig::default(),
            store.clone(),
            StoreBackend::Memory,
        ));
        let state = AppState::new(store, AppConfig::default().auth);
        build_router(state, health, Arc::new(Metrics::new()), Duration::from_secs(5))
    }

    async fn get_status(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        assert_eq!(get_status(test_app(), "/health").await, StatusCode::OK);
        assert_eq!(get_status(test_app(), "/health/live").await, StatusCode::OK);
        assert_eq!(get_status(test_app(), "/health/ready").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        assert_eq!(get_status(test_app(), "/metrics").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_is_mounted_behind_auth() {
        assert_eq!(
            get_status(test_app(), "/api/v1/employees").await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_open_store_falls_back_to_memory() {
        let mut config = AppConfig::default();
        config.database.url = "postgres://nobody@127.0.0.1:1/none".into();
        config.database.pool_timeout_seconds = 1;
        config.database.allow_memory_fallback = true;

        let opened = open_store(&config).await.unwrap();
        assert_eq!(opened.backend, StoreBackend::Memory);
        assert!(opened.database.is_none());
    }

    #[tokio::test]
    async fn test_open_store_without_fallback_fails() {
        let mut config = AppConfig::default();
        config.database.url = "postgres://nobody@127.0.0.1:1/none".into();
        config.database.pool_timeout_seconds = 1;

        assert!(open_store(&config).await.is_err());
    }
}
