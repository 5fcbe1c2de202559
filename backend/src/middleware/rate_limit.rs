// backend/src/middleware/rate_limit.rs
// Per-client sliding-window rate limiting for the API surface.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::{errors::AppError, state::AppState};

/// Sliding-window request counter keyed by client identity.
///
/// Each key holds the timestamps of its requests inside the current
/// window. A request is admitted when, after pruning expired entries,
/// fewer than `limit` timestamps remain.
#[derive(Debug)]
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    requests: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit: limit as usize,
            requests: Mutex::new(HashMap::new()),
            window,
        }
    }

    /// Admits or rejects a request from `key`, recording it when admitted.
    pub fn is_allowed(&self, key: &str) -> bool {
        self.is_allowed_at(key, Instant::now())
    }

    fn is_allowed_at(&self, key: &str, now: Instant) -> bool {
        let mut requests = self.lock_requests();
        let timestamps = requests.entry(key.to_string()).or_default();
        while timestamps
            .front()
            .is_some_and(|t| now.duration_since(*t) >= self.window)
        {
            timestamps.pop_front();
        }
        if timestamps.len() >= self.limit {
            return false;
        }
        timestamps.push_back(now);
        true
    }

    /// Drops keys whose every timestamp has aged out of the window.
    pub fn evict_stale(&self) {
        let now = Instant::now();
        let mut requests = self.lock_requests();
        requests.retain(|_, timestamps| {
            while timestamps
                .front()
                .is_some_and(|t| now.duration_since(*t) >= self.window)
            {
                timestamps.pop_front();
            }
            !timestamps.is_empty()
        });
        debug!(tracked_clients = requests.len(), "rate limiter cleanup ran");
    }

    /// Number of clients currently holding at least one tracked request.
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.lock_requests().len()
    }

    /// Periodically evicts idle clients so the map cannot grow unbounded.
    pub fn spawn_cleanup(self: Arc<Self>, every: Duration) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.evict_stale();
            }
        });
    }

    fn lock_requests(&self) -> MutexGuard<'_, HashMap<String, VecDeque<Instant>>> {
        // A poisoned lock still holds valid timestamps.
        match self.requests.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Rejects over-limit requests with 429 and a Retry-After header.
/// The root and health endpoints stay exempt so probes keep working.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if path == "/" || path == "/health" {
        return next.run(request).await;
    }

    // Peer address is present only when the server was started with
    // connect-info; the proxy headers cover deployment behind a LB.
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let client_ip = client_ip(request.headers(), peer);
    if !state.rate_limiter.is_allowed(&client_ip) {
        warn!(%client_ip, path, "rate limit exceeded");
        let mut response = AppError::RateLimited.into_response();
        response.headers_mut().insert(
            header::RETRY_AFTER,
            HeaderValue::from(state.config.rate_limit_window_secs),
        );
        return response;
    }

    next.run(request).await
}

/// Resolves the client identity used as the rate-limit key. Proxy headers
/// win over the socket address so limits apply per end client, not per
/// load balancer.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(real_ip) = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
    {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }
    peer.map_or_else(|| "unknown".to_string(), |addr| addr.ip().to_string())
}
