use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::state::AppState;

pub const RATE_LIMITED: &str = "Request was throttled.";

/// Fixed-window request limit per client IP, counted in Redis.
/// Without Redis, or when Redis fails, requests pass through.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let Some(redis) = state.redis.as_ref() else {
        return next.run(req).await;
    };
    let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>().copied() else {
        return next.run(req).await;
    };

    let key = format!("ratelimit:{}", addr.ip());
    let limit = state.rate_limit;

    match redis.check_rate_limit(&key, limit.requests, limit.window_seconds).await {
        Ok(true) => next.run(req).await,
        Ok(false) => {
            tracing::debug!("Rate limit exceeded for {}", addr.ip());
            AppError::TooManyRequestsError(RATE_LIMITED.into()).into_response()
        }
        Err(e) => {
            tracing::warn!("Rate limiter unavailable, allowing request: {}", e);
            next.run(req).await
        }
    }
}
