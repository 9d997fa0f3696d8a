//! Health checks
//!
//! Readiness pings the backing store; the result is cached briefly so
//! frequent readiness checks don't hammer the database.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use hr_db::{Database, Store};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy | Self::Degraded)
    }

    fn worst(self, other: HealthStatus) -> HealthStatus {
        match (self, other) {
            (Self::Unhealthy, _) | (_, Self::Unhealthy) => Self::Unhealthy,
            (Self::Degraded, _) | (_, Self::Degraded) => Self::Degraded,
            _ => Self::Healthy,
        }
    }
}

/// Which store the server runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolUsage>,
}

/// Connection counts of the Postgres pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolUsage {
    pub size: u32,
    pub idle: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: Vec<ComponentHealth>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    pub fn http_status(&self) -> StatusCode {
        if self.status.is_healthy() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// Timeout for the store ping
    pub check_timeout: Duration,
    pub cache_duration: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_timeout: Duration::from_secs(5),
            cache_duration: Duration::from_secs(10),
        }
    }
}

struct CachedHealth {
    report: HealthReport,
    cached_at: Instant,
}

pub struct HealthChecker {
    config: HealthConfig,
    start_time: Instant,
    cache: RwLock<Option<CachedHealth>>,
    store: Arc<dyn Store>,
    backend: StoreBackend,
    database: Option<Database>,
}

impl HealthChecker {
    pub fn new(config: HealthConfig, store: Arc<dyn Store>, backend: StoreBackend) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            cache: RwLock::new(None),
            store,
            backend,
            database: None,
        }
    }

    /// Report pool usage alongside the ping
    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    /// Cached report, or a fresh one when the cache is stale
    pub async fn check(&self) -> HealthReport {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.cached_at.elapsed() < self.config.cache_duration {
                    debug!("returning cached health report");
                    return cached.report.clone();
                }
            }
        }

        let report = self.perform_checks().await;

        let mut cache = self.cache.write().await;
        *cache = Some(CachedHealth {
            report: report.clone(),
            cached_at: Instant::now(),
        });
        report
    }

    async fn perform_checks(&self) -> HealthReport {
        let storage = self.check_store().await;
        if !storage.status.is_healthy() {
            warn!(message = ?storage.message, "store health check failed");
        }

        HealthReport {
            status: HealthStatus::Healthy.worst(storage.status),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            components: vec![storage],
            timestamp: chrono::Utc::now(),
        }
    }

    async fn check_store(&self) -> ComponentHealth {
        let start = Instant::now();
        let (status, message) =
            match tokio::time::timeout(self.config.check_timeout, self.store.ping()).await {
                Ok(Ok(())) => match self.backend {
                    StoreBackend::Postgres => (HealthStatus::Healthy, None),
                    StoreBackend::Memory => (
                        HealthStatus::Degraded,
                        Some("in-memory store, data is lost on restart".to_string()),
                    ),
                },
                Ok(Err(err)) => (HealthStatus::Unhealthy, Some(err.to_string())),
                Err(_) => (HealthStatus::Unhealthy, Some("ping timed out".to_string())),
            };

        ComponentHealth {
            name: match self.backend {
                StoreBackend::Postgres => "postgres".to_string(),
                StoreBackend::Memory => "memory".to_string(),
            },
            status,
            message,
            response_time_ms: start.elapsed().as_millis() as u64,
            pool: self.database.as_ref().map(|db| {
                let stats = db.stats();
                PoolUsage {
                    size: stats.size,
                    idle: stats.idle,
                }
            }),
        }
    }
}

/// GET /health, /health/live
pub async fn liveness() -> &'static str {
    "OK"
}

/// GET /health/ready
pub async fn readiness(
    State(health): State<Arc<HealthChecker>>,
) -> (StatusCode, Json<HealthReport>) {
    let report = health.check().await;
    (report.http_status(), Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_db::{MemoryStore, MockStore, RepositoryError};

    #[tokio::test]
    async fn test_memory_store_is_degraded() {
        let checker = HealthChecker::new(
            HealthConfig::default(),
            Arc::new(MemoryStore::new()),
            StoreBackend::Memory,
        );
        let report = checker.check().await;

        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.http_status(), StatusCode::OK);
        assert_eq!(report.components[0].name, "memory");
    }

    #[tokio::test]
    async fn test_failed_ping_is_unhealthy() {
        let mut store = MockStore::new();
        store
            .expect_ping()
            .returning(|| Err(RepositoryError::Decode("connection lost".into())));
        let checker = HealthChecker::new(
            HealthConfig::default(),
            Arc::new(store),
            StoreBackend::Postgres,
        );

        let report = checker.check().await;
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert_eq!(report.http_status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_report_is_cached() {
        let mut store = MockStore::new();
        store.expect_ping().times(1).returning(|| Ok(()));
        let checker = HealthChecker::new(
            HealthConfig {
                cache_duration: Duration::from_secs(60),
                ..Default::default()
            },
            Arc::new(store),
            StoreBackend::Postgres,
        );

        let first = checker.check().await;
        let second = checker.check().await;
        assert_eq!(first.timestamp, second.timestamp);
        assert_eq!(second.status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_postgres_report_includes_pool_usage() {
        let mut store = MockStore::new();
        store.expect_ping().returning(|| Ok(()));
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        let checker = HealthChecker::new(
            HealthConfig::default(),
            Arc::new(store),
            StoreBackend::Postgres,
        )
        .with_database(Database::from(pool));

        let report = checker.check().await;
        assert_eq!(report.components[0].pool, Some(PoolUsage { size: 0, idle: 0 }));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["components"][0]["pool"]["size"], 0);
    }

    #[tokio::test]
    async fn test_memory_report_has_no_pool() {
        let checker = HealthChecker::new(
            HealthConfig::default(),
            Arc::new(MemoryStore::new()),
            StoreBackend::Memory,
        );
        let report = checker.check().await;
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["components"][0].get("pool").is_none());
    }
}
