use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;
use crate::session::SessionStore;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// The authenticated caller, inserted by [`require_session`].
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub token: Uuid,
    pub email: String,
}

#[derive(Debug, Clone)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter with one independent window per caller key.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    windows: Arc<Mutex<HashMap<String, RateLimitWindow>>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Counts one request against `key`. Returns `false` once that key's
    /// window is full. Windows that have run out are dropped on every call.
    async fn admit(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        windows.retain(|_, w| now.duration_since(w.started_at) < self.window);

        let entry = windows
            .entry(key.to_string())
            .or_insert(RateLimitWindow {
                started_at: now,
                count: 0,
            });
        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }
}

/// Limits for the two throttled surfaces: session-scoped routes and login.
#[derive(Debug, Clone)]
pub struct RateLimits {
    pub session: RateLimitState,
    pub login: RateLimitState,
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default()
}

fn rejection(req: &Request, code: &str, message: &str) -> Response {
    ApiError::new(request_id_of(req), code, message).into_response()
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware requiring a live session token as `Authorization: Bearer <uuid>`.
///
/// On success the caller is available to handlers as
/// `Extension<SessionContext>`.
pub async fn require_session(
    State(sessions): State<SessionStore>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = extract_bearer_token(req.headers().get(AUTHORIZATION))
        .and_then(|t| Uuid::parse_str(t).ok());

    let Some(token) = token else {
        return rejection(&req, "unauthorized", "missing or malformed session token");
    };

    match sessions.get(token).await {
        Some(session) => {
            req.extensions_mut().insert(SessionContext {
                token: session.token,
                email: session.email,
            });
            next.run(req).await
        }
        None => rejection(&req, "unauthorized", "session expired or logged out"),
    }
}

/// Per-session request limit for routes behind [`require_session`].
///
/// Must sit inside the session guard so the caller is already known.
pub async fn enforce_session_rate_limit(
    State(limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let key = req
        .extensions()
        .get::<SessionContext>()
        .map_or_else(|| "anonymous".to_string(), |s| s.token.to_string());

    if !limit.admit(&key).await {
        tracing::warn!(session = %key, "session rate limit exceeded");
        return rejection(&req, "rate_limited", "rate limit exceeded");
    }
    next.run(req).await
}

/// Per-client limit on login attempts, keyed by peer IP address.
///
/// Requests without connection info (no `into_make_service_with_connect_info`)
/// share a single window.
pub async fn enforce_login_rate_limit(
    State(limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let key = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |info| info.0.ip().to_string());

    if !limit.admit(&key).await {
        tracing::warn!(peer = %key, "login rate limit exceeded");
        return rejection(&req, "rate_limited", "too many login attempts");
    }
    next.run(req).await
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
