use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Extension,
};
use ytdash_analytics::{render_report, REPORT_CONTENT_TYPE, REPORT_FILENAME};

use crate::middleware::{RequestId, SessionContext};

use super::{ApiError, AppState};

/// Streams the PDF summary of the session's last fetch cycle.
pub(super) async fn download_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
) -> Result<Response, ApiError> {
    let cycle = state
        .sessions
        .get(session.token)
        .await
        .and_then(|s| s.last_cycle)
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                "no fetch has been run in this session",
            )
        })?;

    let bytes = render_report(&cycle.table, &cycle.channels);
    tracing::debug!(bytes = bytes.len(), "report rendered");

    let disposition = format!("attachment; filename=\"{REPORT_FILENAME}\"");
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|_| ApiError::new(req_id.0, "internal_error", "invalid report filename"))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(REPORT_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
