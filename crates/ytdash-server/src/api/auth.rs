use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use ytdash_db::AccountError;

use crate::middleware::{RequestId, SessionContext};

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Deserialize)]
pub(super) struct CredentialsBody {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SignupData {
    email: String,
}

#[derive(Debug, Serialize)]
pub(super) struct LoginData {
    token: Uuid,
    email: String,
    expires_at: DateTime<Utc>,
}

fn map_account_error(request_id: String, error: AccountError) -> ApiError {
    match error {
        AccountError::Validation(e) => ApiError::new(request_id, "validation_error", e.to_string()),
        AccountError::AlreadyExists(_) => ApiError::new(request_id, "conflict", error.to_string()),
        AccountError::NotFound(_) | AccountError::MismatchedSecret => {
            ApiError::new(request_id, "unauthorized", error.to_string())
        }
        AccountError::Db(e) => map_db_error(request_id, &e),
        AccountError::Hashing(e) => {
            tracing::error!(error = %e, "password hashing failed");
            ApiError::new(request_id, "internal_error", "password hashing failed")
        }
    }
}

pub(super) async fn signup(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CredentialsBody>,
) -> Result<(StatusCode, Json<ApiResponse<SignupData>>), ApiError> {
    let user = ytdash_db::create_account(
        &state.pool,
        &body.email,
        &body.password,
        &state.config.allowed_email_domains,
    )
    .await
    .map_err(|e| map_account_error(req_id.0.clone(), e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(req_id.0, SignupData { email: user.email })),
    ))
}

pub(super) async fn login(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CredentialsBody>,
) -> Result<Json<ApiResponse<LoginData>>, ApiError> {
    let user = ytdash_db::verify_account(&state.pool, &body.email, &body.password)
        .await
        .map_err(|e| map_account_error(req_id.0.clone(), e))?;

    let session = state.sessions.create(&user.email).await;
    tracing::info!(
        user = %user.public_id,
        created_at = %session.created_at,
        expires_at = %session.expires_at,
        "session opened"
    );

    Ok(Json(ApiResponse::new(
        req_id.0,
        LoginData {
            token: session.token,
            email: session.email,
            expires_at: session.expires_at,
        },
    )))
}

pub(super) async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> StatusCode {
    state.sessions.remove(session.token).await;
    tracing::info!(email = %session.email, "session closed");
    StatusCode::NO_CONTENT
}
