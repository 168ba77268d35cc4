/// Health, metrics and self-documentation endpoints
use crate::{context::AppContext, metrics};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

/// Health status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub success: bool,
    pub status: String,
    /// "connected" or "disconnected"
    pub bot_status: String,
    pub version: String,
    pub uptime_seconds: f64,
}

/// Build health and documentation routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
}

/// Health check
///
/// Always answers 200 while the process is serving; `bot_status` reports
/// whether the platform session is usable.
pub async fn health_check(State(ctx): State<AppContext>) -> Json<HealthStatus> {
    let connected = ctx.session.is_connected();

    Json(HealthStatus {
        success: true,
        status: "API is running".to_string(),
        bot_status: if connected { "connected" } else { "disconnected" }.to_string(),
        version: ctx.config.service.version.clone(),
        uptime_seconds: ctx.started_at.elapsed().as_secs_f64(),
    })
}

/// Prometheus metrics
pub async fn metrics_endpoint(State(ctx): State<AppContext>) -> impl IntoResponse {
    metrics::UPTIME_SECONDS.set(ctx.started_at.elapsed().as_secs_f64());
    metrics::SESSION_CONNECTED.set(i64::from(ctx.session.is_connected()));

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render_metrics(),
    )
}

/// Root endpoint describing the API
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "message": "Telegram Info API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/info": "GET - Get telegram entity info (requires 'username' parameter)",
            "/health": "GET - Health check",
            "/metrics": "GET - Prometheus metrics",
            "/": "GET - This documentation"
        },
        "usage": {
            "example": "/info?username=telegram",
            "supported": [
                "Usernames (@username or username)",
                "User IDs",
                "Channel usernames",
                "Group usernames",
                "Bot usernames",
                "Telegram links (t.me/username)"
            ]
        },
        "notes": {
            "account_created": "Estimated from the numeric account id; approximate, not reported by Telegram",
            "account_age": "Derived from the estimated creation date"
        }
    }))
}
