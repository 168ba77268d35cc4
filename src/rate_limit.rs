/// Rate Limiting System
use crate::{
    config::RateLimitConfig,
    error::{WhoisError, WhoisResult},
};
use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorLimiter,
};
use std::{num::NonZeroU32, sync::Arc};

/// Paths that are never rate limited
const EXEMPT_PATHS: [&str; 2] = ["/health", "/metrics"];

/// Rate limiter manager
#[derive(Clone)]
pub struct RateLimiter {
    enabled: bool,
    requests_per_second: u32,
    limiter: Arc<GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let rps = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst_size).unwrap_or(rps);

        Self {
            enabled: config.enabled,
            requests_per_second: rps.get(),
            limiter: Arc::new(GovernorLimiter::direct(
                Quota::per_second(rps).allow_burst(burst),
            )),
        }
    }

    /// Check the global rate limit
    pub fn check(&self) -> WhoisResult<()> {
        if !self.enabled {
            return Ok(());
        }

        match self.limiter.check() {
            Ok(_) => Ok(()),
            Err(_) => Err(WhoisError::RateLimitExceeded {
                retry_after: std::time::Duration::from_secs(1),
            }),
        }
    }
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(ctx): State<crate::context::AppContext>,
    request: Request,
    next: Next,
) -> Response {
    if EXEMPT_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    match ctx.rate_limiter.check() {
        Ok(()) => {
            let mut response = next.run(request).await;
            response.headers_mut().insert(
                "X-RateLimit-Limit",
                HeaderValue::from(ctx.rate_limiter.requests_per_second),
            );
            response
        }
        Err(e) => {
            tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(enabled: bool, rps: u32, burst: u32) -> RateLimitConfig {
        RateLimitConfig {
            enabled,
            requests_per_second: rps,
            burst_size: burst,
        }
    }

    #[test]
    fn test_rate_limiter_creation() {
        let limiter = RateLimiter::new(&config(true, 20, 40));

        // Should allow first request
        assert!(limiter.check().is_ok());
    }

    #[test]
    fn test_burst_limit() {
        let limiter = RateLimiter::new(&config(true, 1, 5));

        // Should allow burst requests
        for _ in 0..5 {
            assert!(limiter.check().is_ok());
        }

        // Should hit rate limit after burst
        assert!(limiter.check().is_err());
    }

    #[test]
    fn test_disabled_limiter() {
        let limiter = RateLimiter::new(&config(false, 1, 1));
        for _ in 0..10 {
            assert!(limiter.check().is_ok());
        }
    }

    #[test]
    fn test_zero_values_fall_back() {
        let limiter = RateLimiter::new(&config(true, 0, 0));
        assert_eq!(limiter.requests_per_second, 1);
        assert!(limiter.check().is_ok());
    }
}
