//! Request metrics in Prometheus text format

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, info_span, Instrument};

/// Status classes counted separately
const CLASSES: [&str; 3] = ["2xx", "4xx", "5xx"];

pub struct Metrics {
    requests: AtomicU64,
    /// Indexed like `CLASSES`
    by_class: [AtomicU64; 3],
    /// 401 and 403 responses
    auth_rejections: AtomicU64,
    duration_ms: AtomicU64,
    in_flight: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn class_index(status: StatusCode) -> Option<usize> {
    match status.as_u16() {
        200..=299 => Some(0),
        400..=499 => Some(1),
        500.. => Some(2),
        _ => None,
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
            by_class: Default::default(),
            auth_rejections: AtomicU64::new(0),
            duration_ms: AtomicU64::new(0),
            in_flight: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_request(&self, status: StatusCode, duration_ms: u64) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.duration_ms.fetch_add(duration_ms, Ordering::Relaxed);
        if let Some(index) = class_index(status) {
            self.by_class[index].fetch_add(1, Ordering::Relaxed);
        }
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            self.auth_rejections.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Count for "2xx", "4xx" or "5xx"
    pub fn requests_in_class(&self, class: &str) -> u64 {
        CLASSES
            .iter()
            .position(|c| *c == class)
            .map_or(0, |i| self.by_class[i].load(Ordering::Relaxed))
    }

    pub fn auth_rejections(&self) -> u64 {
        self.auth_rejections.load(Ordering::Relaxed)
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn export_prometheus(&self) -> String {
        let mut out = String::new();
        let mut metric = |name: &str, kind: &str, help: &str, samples: Vec<(String, u64)>| {
            out.push_str(&format!("# HELP hrdash_{name} {help}\n# TYPE hrdash_{name} {kind}\n"));
            for (labels, value) in samples {
                out.push_str(&format!("hrdash_{name}{labels} {value}\n"));
            }
        };

        metric(
            "http_requests_total",
            "counter",
            "Total number of HTTP requests",
            vec![(String::new(), self.requests())],
        );
        metric(
            "http_requests_by_status",
            "counter",
            "HTTP requests by status class",
            CLASSES
                .iter()
                .map(|c| (format!("{{status=\"{c}\"}}"), self.requests_in_class(c)))
                .collect(),
        );
        metric(
            "auth_rejections_total",
            "counter",
            "Requests refused with 401 or 403",
            vec![(String::new(), self.auth_rejections())],
        );
        metric(
            "http_request_duration_ms_total",
            "counter",
            "Total request duration in milliseconds",
            vec![(String::new(), self.duration_ms.load(Ordering::Relaxed))],
        );
        metric(
            "http_requests_in_flight",
            "gauge",
            "Requests being served",
            vec![(String::new(), self.in_flight.load(Ordering::Relaxed))],
        );
        metric(
            "uptime_seconds",
            "gauge",
            "Server uptime in seconds",
            vec![(String::new(), self.uptime_seconds())],
        );

        out
    }

    pub fn export_json(&self) -> serde_json::Value {
        serde_json::json!({
            "http": {
                "requests_total": self.requests(),
                "requests_2xx": self.requests_in_class("2xx"),
                "requests_4xx": self.requests_in_class("4xx"),
                "requests_5xx": self.requests_in_class("5xx"),
                "auth_rejections": self.auth_rejections(),
                "request_duration_ms_total": self.duration_ms.load(Ordering::Relaxed),
                "in_flight": self.in_flight.load(Ordering::Relaxed),
            },
            "uptime_seconds": self.uptime_seconds(),
        })
    }
}

pub async fn metrics_middleware(
    State(metrics): State<Arc<Metrics>>,
    request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().path().to_string();

    metrics.in_flight.fetch_add(1, Ordering::Relaxed);
    let response = next
        .run(request)
        .instrument(info_span!("http_request", %method, %uri))
        .await;
    metrics.in_flight.fetch_sub(1, Ordering::Relaxed);

    let duration = start.elapsed();
    let status = response.status();
    debug!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        "request completed"
    );
    metrics.record_request(status, duration.as_millis() as u64);

    response
}

/// GET /metrics
pub async fn prometheus_metrics(State(metrics): State<Arc<Metrics>>) -> String {
    metrics.export_prometheus()
}

/// GET /metrics.json
pub async fn json_metrics(State(metrics): State<Arc<Metrics>>) -> axum::Json<serde_json::Value> {
    axum::Json(metrics.export_json())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_request() {
        let metrics = Metrics::new();

        metrics.record_request(StatusCode::OK, 50);
        metrics.record_request(StatusCode::FORBIDDEN, 10);
        metrics.record_request(StatusCode::INTERNAL_SERVER_ERROR, 100);
        metrics.record_request(StatusCode::SWITCHING_PROTOCOLS, 0);

        assert_eq!(metrics.requests(), 4);
        assert_eq!(metrics.requests_in_class("2xx"), 1);
        assert_eq!(metrics.requests_in_class("4xx"), 1);
        assert_eq!(metrics.requests_in_class("5xx"), 1);
        assert_eq!(metrics.requests_in_class("3xx"), 0);
        assert_eq!(metrics.auth_rejections(), 1);
    }

    #[test]
    fn test_prometheus_export() {
        let metrics = Metrics::new();
        metrics.record_request(StatusCode::UNAUTHORIZED, 5);

        let output = metrics.export_prometheus();
        assert!(output.contains("hrdash_http_requests_total 1"));
        assert!(output.contains("hrdash_http_requests_by_status{status=\"4xx\"} 1"));
        assert!(output.contains("hrdash_auth_rejections_total 1"));
    }

    #[test]
    fn test_json_export() {
        let metrics = Metrics::new();
        metrics.record_request(StatusCode::CREATED, 50);

        let json = metrics.export_json();
        assert_eq!(json["http"]["requests_total"], 1);
        assert_eq!(json["http"]["requests_2xx"], 1);
    }
}
