mod auth;
mod dashboard;
mod fetch;
mod report;

use std::{sync::Arc, time::Duration};

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use ytdash_core::AppConfig;
use ytdash_youtube::YoutubeClient;

use crate::middleware::{
    enforce_login_rate_limit, enforce_session_rate_limit, request_id, require_session,
    RateLimitState, RateLimits, RequestId,
};
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// `None` when no API key is configured; fetch then answers 503.
    pub youtube: Option<Arc<YoutubeClient>>,
    pub sessions: SessionStore,
    pub config: Arc<AppConfig>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
    youtube: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "provider_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(request_id: String, error: &ytdash_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(sessions: SessionStore, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/fetch", post(fetch::run_fetch))
        .route("/api/v1/dashboard", get(dashboard::get_dashboard))
        .route("/api/v1/report", get(report::download_report))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    sessions,
                    require_session,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_session_rate_limit,
                )),
        )
}

fn login_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/login", post(auth::login))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_login_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limits: RateLimits) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/auth/signup", post(auth::signup));

    Router::new()
        .merge(public_routes)
        .merge(login_router(rate_limits.login))
        .merge(protected_router(state.sessions.clone(), rate_limits.session))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let youtube = if state.youtube.is_some() {
        "configured"
    } else {
        "unconfigured"
    };

    match ytdash_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::new(
                req_id.0,
                HealthData {
                    status: "ok",
                    database: "ok",
                    youtube,
                },
            )),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::new(
                    req_id.0,
                    HealthData {
                        status: "degraded",
                        database: "unavailable",
                        youtube,
                    },
                )),
            )
        }
    }
}

/// 120 requests per minute per session; 10 login attempts per minute per
/// client address.
pub fn default_rate_limits() -> RateLimits {
    RateLimits {
        session: RateLimitState::new(120, Duration::from_secs(60)),
        login: RateLimitState::new(10, Duration::from_secs(60)),
    }
}
