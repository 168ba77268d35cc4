/// Metrics and telemetry for tg-whois
///
/// Provides Prometheus-compatible metrics for monitoring:
/// - HTTP request counts and latencies
/// - Resolution outcomes
/// - Platform lookup results and latencies
/// - Session connectivity

use lazy_static::lazy_static;
use prometheus::{
    register_gauge, register_histogram_vec, register_int_counter_vec, register_int_gauge,
    Encoder, Gauge, HistogramVec, IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    // ========== HTTP Metrics ==========

    /// Total HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request latencies in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // ========== Resolution Metrics ==========

    /// Resolutions by outcome
    pub static ref RESOLUTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "resolutions_total",
        "Total number of entity resolutions",
        &["outcome"]
    )
    .unwrap();

    /// Platform lookups by lookup kind and result
    pub static ref PLATFORM_LOOKUPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "platform_lookups_total",
        "Total number of platform lookups",
        &["lookup", "result"]
    )
    .unwrap();

    /// Platform lookup duration in seconds
    pub static ref PLATFORM_LOOKUP_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "platform_lookup_duration_seconds",
        "Platform lookup latencies in seconds",
        &["lookup"],
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // ========== System Metrics ==========

    /// 1 while the platform session is authenticated
    pub static ref SESSION_CONNECTED: IntGauge = register_int_gauge!(
        "session_connected",
        "Whether the platform session is connected"
    )
    .unwrap();

    /// Application uptime in seconds
    pub static ref UPTIME_SECONDS: Gauge = register_gauge!(
        "uptime_seconds",
        "Application uptime in seconds"
    )
    .unwrap();
}

/// Render metrics in Prometheus text format
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration);
}

/// Record the outcome of a resolution
pub fn record_resolution(outcome: &str) {
    RESOLUTIONS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Record a single platform lookup
pub fn record_platform_lookup(lookup: &str, result: &str, duration: f64) {
    PLATFORM_LOOKUPS_TOTAL
        .with_label_values(&[lookup, result])
        .inc();
    PLATFORM_LOOKUP_DURATION_SECONDS
        .with_label_values(&[lookup])
        .observe(duration);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/info", 200, 0.05);
        let metrics = render_metrics();
        assert!(metrics.contains("http_requests_total"));
        assert!(metrics.contains("http_request_duration_seconds"));
    }

    #[test]
    fn test_record_resolution() {
        record_resolution("account");
        record_resolution("not_found");
        let metrics = render_metrics();
        assert!(metrics.contains("resolutions_total"));
        assert!(metrics.contains("outcome=\"not_found\""));
    }

    #[test]
    fn test_record_platform_lookup() {
        record_platform_lookup("chat", "timeout", 10.0);
        let metrics = render_metrics();
        assert!(metrics.contains("platform_lookups_total"));
        assert!(metrics.contains("platform_lookup_duration_seconds"));
    }

    #[test]
    fn test_gauges_render() {
        SESSION_CONNECTED.set(1);
        UPTIME_SECONDS.set(12.0);
        let metrics = render_metrics();
        assert!(metrics.contains("session_connected 1"));
        assert!(metrics.contains("uptime_seconds"));
    }
}
